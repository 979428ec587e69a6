use tracing::{debug, info, instrument};

use crate::metrics::{self, MetricName};
use crate::table::{Row, Table};

/// Drop the named columns. Names that are not in the table are skipped,
/// so pruning is idempotent.
#[instrument(skip(table), fields(rows = table.len()))]
pub fn prune_columns<S: AsRef<str> + std::fmt::Debug>(table: &Table, drop: &[S]) -> Table {
    let keep: Vec<usize> = (0..table.headers.len())
        .filter(|&i| !drop.iter().any(|d| d.as_ref() == table.headers[i]))
        .collect();

    for name in drop {
        if table.column_index(name.as_ref()).is_none() {
            debug!("Column '{}' not present, nothing to drop", name.as_ref());
        }
    }

    let pruned = table.headers.len() - keep.len();
    if pruned > 0 {
        info!("Dropped {} columns", pruned);
        metrics::record(MetricName::ColumnsPruned, pruned);
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            Row::new(
                row.source_index,
                keep.iter()
                    .map(|&i| row.cells.get(i).cloned().flatten())
                    .collect(),
            )
        })
        .collect();

    Table {
        headers: keep.iter().map(|&i| table.headers[i].clone()).collect(),
        kinds: keep.iter().map(|&i| table.kinds[i]).collect(),
        rows,
    }
}
