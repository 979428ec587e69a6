//! Text report: the summaries printed by the `report` command.

use std::fmt;

use crate::analysis::{BoxSummary, Insights};
use crate::config::ListingConfig;
use crate::constants::{
    COL_APP, COL_CATEGORY, COL_CONTENT_RATING, COL_COUNT, COL_GENRE, COL_GENRES, COL_INSTALLS,
    COL_PRICE, COL_RATING, COL_REVENUE, COL_REVIEWS, COL_SIZE_MB, COL_TYPE,
};
use crate::frame::{Frame, Value};
use crate::record::AppRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Line(String),
    Table(Frame),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Line(text.into()));
        self
    }

    fn table(mut self, frame: Frame) -> Self {
        self.blocks.push(Block::Table(frame));
        self
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        for block in &self.blocks {
            match block {
                Block::Line(text) => writeln!(f, "{}", text)?,
                Block::Table(frame) if frame.is_empty() => writeln!(f, "(no rows)")?,
                Block::Table(frame) => write!(f, "{}", frame)?,
            }
        }
        Ok(())
    }
}

const TOP_RATED_COLUMNS: [&str; 7] = [
    COL_APP,
    COL_CATEGORY,
    COL_RATING,
    COL_REVIEWS,
    COL_SIZE_MB,
    COL_INSTALLS,
    COL_PRICE,
];
const LARGEST_COLUMNS: [&str; 5] = [COL_APP, COL_CATEGORY, COL_RATING, COL_SIZE_MB, COL_INSTALLS];
const MOST_REVIEWED_COLUMNS: [&str; 6] = [
    COL_APP,
    COL_CATEGORY,
    COL_RATING,
    COL_REVIEWS,
    COL_INSTALLS,
    COL_PRICE,
];
const PRICE_COLUMNS: [&str; 4] = [COL_APP, COL_CATEGORY, COL_PRICE, COL_INSTALLS];

fn record_value(r: &AppRecord, column: &str) -> Value {
    match column {
        COL_APP => r.app.as_str().into(),
        COL_CATEGORY => r.category.as_str().into(),
        COL_RATING => r.rating.into(),
        COL_REVIEWS => r.reviews.into(),
        COL_SIZE_MB => r.size_mb.into(),
        COL_INSTALLS => r.installs.into(),
        COL_PRICE => r.price.into(),
        _ => Value::Text(String::new()),
    }
}

/// One row per record, restricted to `columns`
fn listing_frame(records: &[AppRecord], columns: &[&str]) -> Frame {
    let mut frame = Frame::new(columns);
    for r in records {
        frame.push(columns.iter().map(|c| record_value(r, c)).collect());
    }
    frame
}

pub(crate) fn counts_frame(key: &str, counts: &[(String, usize)]) -> Frame {
    let mut frame = Frame::new(&[key, COL_COUNT]);
    for (k, n) in counts {
        frame.push(vec![k.as_str().into(), (*n).into()]);
    }
    frame
}

pub(crate) fn box_frame<K: fmt::Display>(key: &str, boxes: &[(K, BoxSummary)]) -> Frame {
    let mut frame = Frame::new(&[key, "count", "min", "q1", "median", "q3", "max"]);
    for (k, b) in boxes {
        frame.push(vec![
            Value::Text(k.to_string()),
            b.count.into(),
            b.min.into(),
            b.q1.into(),
            b.median.into(),
            b.q3.into(),
            b.max.into(),
        ]);
    }
    frame
}

/// Every report section, in print order
pub fn build(insights: &Insights, listings: &ListingConfig) -> Vec<Section> {
    let mut grossing = Frame::new(&[COL_APP, COL_CATEGORY, COL_PRICE, COL_INSTALLS, COL_REVENUE]);
    for e in &insights.top_grossing {
        grossing.push(vec![
            e.record.app.as_str().into(),
            e.record.category.as_str().into(),
            e.record.price.into(),
            e.record.installs.into(),
            e.revenue.into(),
        ]);
    }

    let mut mean_rating = Frame::new(&[COL_CATEGORY, COL_RATING]);
    for s in &insights.mean_rating_by_category {
        mean_rating.push(vec![s.category.as_str().into(), s.mean.into()]);
    }

    let mut category_type = Frame::new(&[COL_CATEGORY, COL_TYPE, COL_COUNT]);
    for (category, app_type, n) in &insights.category_type_counts {
        category_type.push(vec![
            category.as_str().into(),
            app_type.as_str().into(),
            (*n).into(),
        ]);
    }

    let top_genres = &insights.genre_counts[..insights.genre_counts.len().min(listings.top_genres)];

    let median_price = match insights.median_paid_price {
        Some(p) => format!("Median price of a paid app: {}", Value::Float(p)),
        None => "Median price of a paid app: n/a (no paid apps)".to_string(),
    };

    vec![
        Section::new("Extreme install counts")
            .line(format!(
                "Apps with over 1 billion installs: {}",
                insights.billion_install_apps
            ))
            .line(format!(
                "Apps with a single install: {}",
                insights.single_install_apps
            )),
        Section::new("Highest rated apps")
            .table(listing_frame(&insights.top_rated, &TOP_RATED_COLUMNS)),
        Section::new("Largest apps by size")
            .table(listing_frame(&insights.largest, &LARGEST_COLUMNS)),
        Section::new("Most reviewed apps")
            .table(listing_frame(&insights.most_reviewed, &MOST_REVIEWED_COLUMNS)),
        Section::new("Most expensive apps")
            .table(listing_frame(&insights.most_expensive, &PRICE_COLUMNS)),
        Section::new("Highest grossing paid apps")
            .table(grossing)
            .line(format!(
                "Games among the top {}: {}",
                insights.top_grossing.len(),
                insights.games_in_top_grossing
            )),
        Section::new("Content ratings")
            .table(counts_frame(COL_CONTENT_RATING, &insights.content_rating_counts)),
        Section::new("Apps per category")
            .table(counts_frame(COL_CATEGORY, &insights.category_counts)),
        Section::new("Average rating per category").table(mean_rating),
        Section::new("Genre combinations")
            .table(counts_frame(COL_GENRES, &insights.genre_combinations)),
        Section::new("Genres")
            .line(format!("Unique genres: {}", insights.unique_genres))
            .line(format!("Apps with more than one genre: {}", insights.multi_genre_apps))
            .table(counts_frame(COL_GENRE, top_genres)),
        Section::new("Free vs paid apps per category").table(category_type),
        Section::new("Installs by type").table(box_frame(COL_TYPE, &insights.installs_by_type)),
        Section::new("Paid app pricing")
            .line(median_price)
            .table(box_frame(COL_CATEGORY, &insights.price_by_category)),
        Section::new("Revenue per category")
            .table(box_frame(COL_CATEGORY, &insights.revenue_by_category)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::pipeline::{CleanedCatalogue, CleaningReport};
    use crate::record::fixtures::{app, paid};

    fn insights() -> Insights {
        let mut top = app(0, "Chess", "BOARD");
        top.rating = 4.9;
        let records = vec![
            top,
            app(1, "Notes", "PRODUCTIVITY"),
            paid(2, "Minecraft", "FAMILY", 6.99, 10_000_000),
        ];
        let catalogue = CleanedCatalogue {
            within_ceiling: records.clone(),
            records,
            report: CleaningReport::default(),
        };
        Insights::compute(&catalogue, &AnalysisConfig::default())
    }

    #[test]
    fn test_sections_render_listings() {
        let sections = build(&insights(), &ListingConfig::default());
        let rated = sections
            .iter()
            .find(|s| s.title == "Highest rated apps")
            .unwrap()
            .to_string();
        let first_row = rated.lines().nth(2).unwrap();
        assert!(first_row.starts_with("Chess"));
        assert!(rated.contains("Size_MB"));
    }

    fn table_columns(sections: &[Section], title: &str) -> Vec<String> {
        let section = sections.iter().find(|s| s.title == title).unwrap();
        match &section.blocks[0] {
            Block::Table(frame) => frame.columns.clone(),
            Block::Line(_) => panic!("{} starts with a line", title),
        }
    }

    #[test]
    fn test_each_listing_has_its_own_columns() {
        let sections = build(&insights(), &ListingConfig::default());
        assert_eq!(
            table_columns(&sections, "Largest apps by size"),
            vec!["App", "Category", "Rating", "Size_MB", "Installs"]
        );
        assert_eq!(
            table_columns(&sections, "Most reviewed apps"),
            vec!["App", "Category", "Rating", "Reviews", "Installs", "Price"]
        );
        assert_eq!(
            table_columns(&sections, "Most expensive apps"),
            vec!["App", "Category", "Price", "Installs"]
        );
        assert_eq!(table_columns(&sections, "Highest rated apps").len(), 7);
    }

    #[test]
    fn test_grossing_section_counts_games() {
        let sections = build(&insights(), &ListingConfig::default());
        let grossing = sections
            .iter()
            .find(|s| s.title == "Highest grossing paid apps")
            .unwrap()
            .to_string();
        assert!(grossing.contains("Revenue_Estimate"));
        assert!(grossing.contains("Games among the top 1: 0"));
    }

    #[test]
    fn test_empty_table_is_marked() {
        let section = Section::new("Revenue per category").table(Frame::new(&["Category"]));
        assert_eq!(section.to_string(), "== Revenue per category ==\n(no rows)\n");
    }
}
