use serde::Serialize;
use std::cmp::Ordering;

use crate::record::{AppRecord, NumericColumn};

/// Highest `n` records by `column`. Equal values keep source order.
pub fn top_n_by(records: &[AppRecord], column: NumericColumn, n: usize) -> Vec<&AppRecord> {
    let mut ranked: Vec<&AppRecord> = records.iter().collect();
    ranked.sort_by(|a, b| descending(a.value(column), b.value(column)).then(a.id.cmp(&b.id)));
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueEntry {
    pub record: AppRecord,
    pub revenue: f64,
}

/// Paid records ranked by estimated revenue, highest first
pub fn revenue_ranking(records: &[AppRecord]) -> Vec<RevenueEntry> {
    let mut ranked: Vec<RevenueEntry> = records
        .iter()
        .filter_map(|r| {
            r.revenue_estimate().map(|revenue| RevenueEntry {
                record: r.clone(),
                revenue,
            })
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.revenue, b.revenue).then(a.record.id.cmp(&b.record.id)));
    ranked
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
