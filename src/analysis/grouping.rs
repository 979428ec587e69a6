use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::record::{AppRecord, AppType, NumericColumn};

/// Count, sum and mean of one numeric column within a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
}

/// Per-category aggregates over `column`, ordered by category name
pub fn by_category(records: &[AppRecord], column: NumericColumn) -> Vec<CategoryStats> {
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(r.category.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += r.value(column);
    }
    groups
        .into_iter()
        .map(|(category, (count, sum))| CategoryStats {
            category: category.to_string(),
            count,
            sum,
            mean: sum / count as f64,
        })
        .collect()
}

/// App counts per (category, type), ordered by category then Free before Paid
pub fn count_by_category_and_type(records: &[AppRecord]) -> Vec<(String, AppType, usize)> {
    let mut groups: BTreeMap<(&str, AppType), usize> = BTreeMap::new();
    for r in records {
        *groups.entry((r.category.as_str(), r.app_type)).or_insert(0) += 1;
    }
    groups
        .into_iter()
        .map(|((category, app_type), count)| (category.to_string(), app_type, count))
        .collect()
}

/// Occurrences of each distinct value, most frequent first.
/// Equal counts keep the order in which values first appeared.
pub fn value_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        let count = counts.entry(v).or_insert_with(|| {
            order.push(v);
            0
        });
        *count += 1;
    }

    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|v| (v.to_string(), counts[v]))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Competition versus popularity for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Concentration {
    pub category: String,
    pub apps: usize,
    pub total_installs: u64,
}

pub fn category_concentration(records: &[AppRecord]) -> Vec<Concentration> {
    let mut groups: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(r.category.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(r.installs);
    }
    groups
        .into_iter()
        .map(|(category, (apps, total_installs))| Concentration {
            category: category.to_string(),
            apps,
            total_installs,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::{app, paid};

    fn sample() -> Vec<AppRecord> {
        let mut a = app(0, "a", "TOOLS");
        a.rating = 4.0;
        a.installs = 100;
        let mut b = app(1, "b", "GAME");
        b.rating = 3.0;
        b.installs = 1_000;
        let mut c = app(2, "c", "TOOLS");
        c.rating = 5.0;
        c.installs = 50;
        let d = paid(3, "d", "GAME", 1.99, 10);
        vec![a, b, c, d]
    }

    #[test]
    fn test_by_category_mean_and_sum() {
        let stats = by_category(&sample(), NumericColumn::Rating);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "GAME");
        assert_eq!(stats[1].category, "TOOLS");
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].mean, 4.5);

        let installs = by_category(&sample(), NumericColumn::Installs);
        assert_eq!(installs[0].sum, 1_010.0);
    }

    #[test]
    fn test_category_type_counts() {
        let counts = count_by_category_and_type(&sample());
        assert_eq!(
            counts,
            vec![
                ("GAME".to_string(), AppType::Free, 1),
                ("GAME".to_string(), AppType::Paid, 1),
                ("TOOLS".to_string(), AppType::Free, 2),
            ]
        );
    }

    #[test]
    fn test_value_counts_ties_keep_first_appearance() {
        let counts = value_counts(["Teen", "Everyone", "Mature 17+", "Everyone", "Teen", "Adults"]);
        assert_eq!(
            counts,
            vec![
                ("Teen".to_string(), 2),
                ("Everyone".to_string(), 2),
                ("Mature 17+".to_string(), 1),
                ("Adults".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_concentration() {
        let c = category_concentration(&sample());
        assert_eq!(c[0], Concentration { category: "GAME".into(), apps: 2, total_installs: 1_010 });
        assert_eq!(c[1].total_installs, 150);
    }
}
