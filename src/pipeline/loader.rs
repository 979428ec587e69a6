use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::metrics::{self, MetricName};
use crate::table::{Row, Table};

/// Reads a delimited catalogue file into a `Table`
pub struct Loader {
    delimiter: u8,
    missing_markers: Vec<String>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl Loader {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            delimiter: b',',
            missing_markers: config.missing_markers.clone(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a file. Missing, unreadable and ragged files are all `LoadError`s.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<Table> {
        let _timer = metrics::StageTimer::start("load");
        let file = File::open(path).map_err(|e| AnalysisError::load(path, e.to_string()))?;
        let table = self.load_from_reader(file, path)?;
        info!(
            "Loaded {} rows x {} columns",
            table.len(),
            table.headers.len()
        );
        metrics::record(MetricName::RowsLoaded, table.len());
        Ok(table)
    }

    /// Parse delimited content from any reader; `source` only labels errors
    pub fn load_from_reader<R: Read>(&self, reader: R, source: &Path) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(Trim::None)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AnalysisError::load(source, format!("failed to read header: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(AnalysisError::load(source, "file has no header row"));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AnalysisError::load(source, format!("malformed row {}: {}", index + 1, e))
            })?;

            let cells = record
                .iter()
                .map(|cell| {
                    if self.is_missing(cell) {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            rows.push(Row::new(index, cells));
        }

        let table = Table::new(headers, rows);
        for (header, kind) in table.headers.iter().zip(&table.kinds) {
            debug!("Column '{}' inferred as {:?}", header, kind);
        }
        Ok(table)
    }

    fn is_missing(&self, cell: &str) -> bool {
        let trimmed = cell.trim();
        self.missing_markers.iter().any(|m| m == trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use std::io::Write;

    fn load_str(content: &str) -> Result<Table> {
        Loader::default().load_from_reader(content.as_bytes(), Path::new("inline.csv"))
    }

    #[test]
    fn test_loads_rows_and_marks_missing() -> anyhow::Result<()> {
        let table = load_str("App,Rating,Size\nChess,4.5,19M\nNotes,NaN,14k\n")?;
        assert_eq!(table.headers, vec!["App", "Rating", "Size"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].cells[1].as_deref(), Some("4.5"));
        assert_eq!(table.rows[1].cells[1], None);
        assert_eq!(table.rows[1].source_index, 1);
        Ok(())
    }

    #[test]
    fn test_infers_kinds_but_keeps_text() -> anyhow::Result<()> {
        let table = load_str("App,Reviews,Rating,Installs\nA,10,4.1,\"1,000+\"\nB,20,3,\"5+\"\n")?;
        assert_eq!(table.kind_of("Reviews"), Some(ColumnKind::Integer));
        assert_eq!(table.kind_of("Rating"), Some(ColumnKind::Float));
        assert_eq!(table.kind_of("Installs"), Some(ColumnKind::Text));
        assert_eq!(table.rows[0].cells[3].as_deref(), Some("1,000+"));
        Ok(())
    }

    #[test]
    fn test_ragged_rows_fail() {
        let err = load_str("App,Rating\nChess,4.5\nBroken\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Load { .. }));
        assert!(err.to_string().contains("malformed row 2"));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = Loader::default()
            .load(Path::new("/no/such/catalogue.csv"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Load { .. }));
    }

    #[test]
    fn test_empty_file_fails() {
        assert!(matches!(load_str(""), Err(AnalysisError::Load { .. })));
    }

    #[test]
    fn test_custom_delimiter() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "App\tRating\nChess\t4.5\n")?;
        let table = Loader::default().with_delimiter(b'\t').load(file.path())?;
        assert_eq!(table.headers, vec!["App", "Rating"]);
        assert_eq!(table.len(), 1);
        Ok(())
    }
}
