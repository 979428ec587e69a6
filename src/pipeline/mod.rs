//! Cleaning pipeline: load -> prune -> sanitize -> size filter -> normalize -> price ceiling.
//!
//! Every stage is a pure function of its input table; `Pipeline` only wires
//! them together and keeps the counts.

pub mod loader;
pub mod normalize;
pub mod prune;
pub mod sanitize;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{info, info_span, instrument};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::metrics::StageTimer;
use crate::record::AppRecord;
use crate::table::Table;

pub use loader::Loader;

/// Row accounting for one cleaning run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_loaded: usize,
    pub columns_dropped: Vec<String>,
    pub missing_dropped: usize,
    pub duplicates_dropped: usize,
    pub size_dropped: usize,
    pub rejected: usize,
    pub rejected_by_field: BTreeMap<String, usize>,
    pub rows_cleaned: usize,
    pub above_price_ceiling: usize,
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows loaded:               {}", self.rows_loaded)?;
        if !self.columns_dropped.is_empty() {
            writeln!(f, "Columns dropped:           {}", self.columns_dropped.join(", "))?;
        }
        writeln!(f, "Rows with missing values:  {}", self.missing_dropped)?;
        writeln!(f, "Duplicate rows:            {}", self.duplicates_dropped)?;
        writeln!(f, "Rows without numeric size: {}", self.size_dropped)?;
        writeln!(f, "Rows with bad fields:      {}", self.rejected)?;
        for (field, count) in &self.rejected_by_field {
            writeln!(f, "  {}: {}", field, count)?;
        }
        writeln!(f, "Rows cleaned:              {}", self.rows_cleaned)?;
        writeln!(f, "Priced above ceiling:      {}", self.above_price_ceiling)
    }
}

/// Result of a full cleaning run
#[derive(Debug, Clone)]
pub struct CleanedCatalogue {
    /// Every cleaned record, in source order
    pub records: Vec<AppRecord>,
    /// Records at or below the price ceiling; input to revenue analysis and later views
    pub within_ceiling: Vec<AppRecord>,
    pub report: CleaningReport,
}

pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load a catalogue file and clean it
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn run(&self, path: &Path) -> Result<CleanedCatalogue> {
        let table = Loader::new(&self.config).load(path)?;
        self.clean(&table)
    }

    /// Run every cleaning stage over an already loaded table
    pub fn clean(&self, table: &Table) -> Result<CleanedCatalogue> {
        let mut report = CleaningReport {
            rows_loaded: table.len(),
            ..CleaningReport::default()
        };

        let pruned = {
            let _span = info_span!("prune").entered();
            let _timer = StageTimer::start("prune");
            let pruned = prune::prune_columns(table, &self.config.dropped_columns);
            report.columns_dropped = table
                .headers
                .iter()
                .filter(|h| pruned.column_index(h).is_none())
                .cloned()
                .collect();
            pruned
        };

        normalize::check_schema(&pruned)?;

        let sanitized = {
            let _span = info_span!("sanitize").entered();
            let _timer = StageTimer::start("sanitize");
            let (sanitized, stats) = sanitize::sanitize(&pruned);
            report.missing_dropped = stats.missing_dropped;
            report.duplicates_dropped = stats.duplicates_dropped;
            sanitized
        };

        let sized = {
            let _span = info_span!("size_filter").entered();
            let _timer = StageTimer::start("size_filter");
            let (sized, dropped) = normalize::filter_sizes(&sanitized, &self.config)?;
            report.size_dropped = dropped;
            sized
        };

        let records = {
            let _span = info_span!("normalize").entered();
            let _timer = StageTimer::start("normalize");
            let (records, stats) = normalize::normalize(&sized, &self.config)?;
            report.rejected = stats.rejected;
            report.rejected_by_field = stats
                .rejected_by_field
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            records
        };
        report.rows_cleaned = records.len();

        let (within_ceiling, excluded) =
            normalize::apply_price_ceiling(&records, self.config.price_ceiling);
        report.above_price_ceiling = excluded;

        info!(
            "Cleaning complete: {} of {} rows kept",
            report.rows_cleaned, report.rows_loaded
        );

        Ok(CleanedCatalogue {
            records,
            within_ceiling,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::table::fixtures::table;

    const HEADERS: [&str; 12] = [
        "App", "Category", "Rating", "Reviews", "Size", "Installs", "Type", "Price",
        "Content Rating", "Genres", "Last Updated", "Android Ver",
    ];

    #[test]
    fn test_clean_counts_every_drop() -> anyhow::Result<()> {
        let t = table(
            &HEADERS,
            &[
                &["A", "TOOLS", "4.1", "10", "19M", "1,000+", "Free", "0", "Everyone", "Tools", "2018", "4.0"],
                &["A", "TOOLS", "4.1", "10", "19M", "1,000+", "Free", "0", "Everyone", "Tools", "2018", "4.0"],
                &["B", "TOOLS", "", "10", "19M", "1,000+", "Free", "0", "Everyone", "Tools", "2018", "4.0"],
                &["C", "TOOLS", "4.0", "10", "Varies with device", "1,000+", "Free", "0", "Everyone", "Tools", "2018", "4.0"],
                &["D", "TOOLS", "4.0", "3.0M", "2M", "1,000+", "Free", "0", "Everyone", "Tools", "2018", "4.0"],
                &["E", "LIFESTYLE", "3.6", "275", "7.3M", "10,000+", "Paid", "$399.99", "Everyone", "Lifestyle", "2018", "4.1"],
            ],
        );

        let out = Pipeline::new(AnalysisConfig::default()).clean(&t)?;
        let r = &out.report;
        assert_eq!(r.rows_loaded, 6);
        assert_eq!(r.columns_dropped, vec!["Last Updated", "Android Ver"]);
        assert_eq!(r.duplicates_dropped, 1);
        assert_eq!(r.missing_dropped, 1);
        assert_eq!(r.size_dropped, 1);
        assert_eq!(r.rejected, 1);
        assert_eq!(r.rejected_by_field.get("Reviews"), Some(&1));
        assert_eq!(r.rows_cleaned, 2);
        assert_eq!(r.above_price_ceiling, 1);
        assert_eq!(out.within_ceiling.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_required_column_aborts() {
        let t = table(&["App", "Category"], &[&["A", "TOOLS"]]);
        let err = Pipeline::new(AnalysisConfig::default()).clean(&t).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }
}
