use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::grouping::value_counts;
use crate::record::AppRecord;

/// One (app, genre) membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenrePair {
    pub app_id: usize,
    pub genre: String,
}

/// The app-to-genre relation, built once and shared by every genre view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreTable {
    pairs: Vec<GenrePair>,
}

impl GenreTable {
    /// Expand each record's genre list into one pair per genre
    pub fn build(records: &[AppRecord], delimiter: char) -> Self {
        let pairs = records
            .iter()
            .flat_map(|r| {
                r.genre_list(delimiter).map(move |g| GenrePair {
                    app_id: r.id,
                    genre: g.to_string(),
                })
            })
            .collect();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[GenrePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apps per individual genre, most common first
    pub fn counts(&self) -> Vec<(String, usize)> {
        value_counts(self.pairs.iter().map(|p| p.genre.as_str()))
    }

    pub fn unique_genres(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| p.genre.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of apps tagged with more than one genre
    pub fn multi_genre_apps(&self) -> usize {
        let mut per_app: BTreeMap<usize, usize> = BTreeMap::new();
        for p in &self.pairs {
            *per_app.entry(p.app_id).or_insert(0) += 1;
        }
        per_app.values().filter(|&&n| n > 1).count()
    }

    pub fn genres_of(&self, app_id: usize) -> impl Iterator<Item = &str> {
        self.pairs
            .iter()
            .filter(move |p| p.app_id == app_id)
            .map(|p| p.genre.as_str())
    }
}

/// Raw genre strings, combinations included, most common first
pub fn combination_counts(records: &[AppRecord]) -> Vec<(String, usize)> {
    value_counts(records.iter().map(|r| r.genres.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::app;

    fn tagged(id: usize, genres: &str) -> AppRecord {
        let mut r = app(id, "x", "FAMILY");
        r.genres = genres.to_string();
        r
    }

    #[test]
    fn test_multi_genre_app_yields_one_pair_per_genre() {
        let table = GenreTable::build(&[tagged(7, "Art & Design;Creativity")], ';');
        assert_eq!(
            table.pairs(),
            &[
                GenrePair { app_id: 7, genre: "Art & Design".into() },
                GenrePair { app_id: 7, genre: "Creativity".into() },
            ]
        );
    }

    #[test]
    fn test_every_app_contributes_a_pair() {
        let records = vec![tagged(0, "Puzzle"), tagged(1, "Puzzle;Brain Games"), tagged(2, "Casual")];
        let table = GenreTable::build(&records, ';');
        for r in &records {
            assert!(table.genres_of(r.id).count() >= 1);
        }
    }

    #[test]
    fn test_counts_and_summaries() {
        let records = vec![
            tagged(0, "Puzzle"),
            tagged(1, "Puzzle;Brain Games"),
            tagged(2, "Casual;Brain Games"),
            tagged(3, "Puzzle"),
        ];
        let table = GenreTable::build(&records, ';');
        assert_eq!(table.len(), 6);
        assert_eq!(table.unique_genres(), 3);
        assert_eq!(table.multi_genre_apps(), 2);
        assert_eq!(
            table.counts(),
            vec![
                ("Puzzle".to_string(), 3),
                ("Brain Games".to_string(), 2),
                ("Casual".to_string(), 1),
            ]
        );

        let combos = combination_counts(&records);
        assert_eq!(combos[0], ("Puzzle".to_string(), 2));
    }
}
