//! Stage metrics for the cleaning pipeline
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding program installs a recorder, in which case these become ordinary
//! Prometheus-style series.

use std::fmt;
use std::time::Instant;

/// Every metric name the pipeline records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RowsLoaded,
    ColumnsPruned,
    RowsMissingDropped,
    RowsDuplicateDropped,
    RowsRejected,
    RowsSizeDropped,
    RowsAbovePriceCeiling,
    RowsCleaned,
    ViewsPresented,
    StageDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RowsLoaded => "playstore_rows_loaded_total",
            MetricName::ColumnsPruned => "playstore_columns_pruned_total",
            MetricName::RowsMissingDropped => "playstore_rows_missing_dropped_total",
            MetricName::RowsDuplicateDropped => "playstore_rows_duplicate_dropped_total",
            MetricName::RowsRejected => "playstore_rows_rejected_total",
            MetricName::RowsSizeDropped => "playstore_rows_size_dropped_total",
            MetricName::RowsAbovePriceCeiling => "playstore_rows_above_price_ceiling_total",
            MetricName::RowsCleaned => "playstore_rows_cleaned_total",
            MetricName::ViewsPresented => "playstore_views_presented_total",
            MetricName::StageDuration => "playstore_stage_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn record(name: MetricName, count: usize) {
    ::metrics::counter!(name.as_str()).increment(count as u64);
}

/// Rejections are labelled by the column whose parse failed
pub fn record_rejection(field: &'static str) {
    ::metrics::counter!(MetricName::RowsRejected.as_str(), "field" => field).increment(1);
}

/// Records the elapsed time of a stage when dropped
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => self.stage)
            .record(duration);
    }
}
