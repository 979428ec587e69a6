use std::collections::HashSet;
use tracing::{info, instrument};

use crate::metrics::{self, MetricName};
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeStats {
    pub missing_dropped: usize,
    pub duplicates_dropped: usize,
}

/// Remove rows holding any missing cell, then exact duplicates.
///
/// Duplicates are compared on cell contents only; the first occurrence wins
/// and survivors keep their original order.
#[instrument(skip(table), fields(rows = table.len()))]
pub fn sanitize(table: &Table) -> (Table, SanitizeStats) {
    let complete: Vec<_> = table.rows.iter().filter(|r| !r.has_missing()).collect();
    let missing_dropped = table.len() - complete.len();

    let mut seen: HashSet<&[Option<String>]> = HashSet::with_capacity(complete.len());
    let mut rows = Vec::with_capacity(complete.len());
    for row in complete {
        if seen.insert(row.cells.as_slice()) {
            rows.push(row.clone());
        }
    }
    let duplicates_dropped = table.len() - missing_dropped - rows.len();

    info!(
        "Sanitized: {} rows kept, {} with missing values, {} duplicates",
        rows.len(),
        missing_dropped,
        duplicates_dropped
    );
    metrics::record(MetricName::RowsMissingDropped, missing_dropped);
    metrics::record(MetricName::RowsDuplicateDropped, duplicates_dropped);

    (
        table.with_rows(rows),
        SanitizeStats {
            missing_dropped,
            duplicates_dropped,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::table;

    #[test]
    fn test_drops_missing_then_duplicates() {
        let t = table(
            &["App", "Rating"],
            &[
                &["Chess", "4.5"],
                &["Notes", ""],
                &["Chess", "4.5"],
                &["Maps", "4.0"],
                &["Chess", "4.4"],
            ],
        );
        let (clean, stats) = sanitize(&t);
        assert_eq!(stats, SanitizeStats { missing_dropped: 1, duplicates_dropped: 1 });

        let order: Vec<usize> = clean.rows.iter().map(|r| r.source_index).collect();
        assert_eq!(order, vec![0, 3, 4]);
    }

    #[test]
    fn test_survivors_hold_no_missing_and_are_distinct() {
        let t = table(
            &["a", "b"],
            &[&["1", "2"], &["", "2"], &["1", "2"], &["1", ""], &["3", "4"]],
        );
        let (clean, _) = sanitize(&t);
        assert!(clean.rows.iter().all(|r| !r.has_missing()));
        let unique: HashSet<_> = clean.rows.iter().map(|r| r.cells.clone()).collect();
        assert_eq!(unique.len(), clean.len());
    }

    #[test]
    fn test_empty_table() {
        let t = table(&["App"], &[]);
        let (clean, stats) = sanitize(&t);
        assert!(clean.is_empty());
        assert_eq!(stats, SanitizeStats::default());
    }
}
