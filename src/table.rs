//! Raw string table flowing through the loader, pruner and sanitizer.
//!
//! Cells stay as text until the normalize stage parses them into an
//! `AppRecord`. A `None` cell is a missing value.

use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// Primitive type inferred for a column at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    /// Mixed or non-numeric content, left for explicit parsing
    Text,
}

impl ColumnKind {
    /// Infer the narrowest kind that every present cell satisfies
    pub fn infer<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> Self {
        let mut kind = ColumnKind::Integer;
        let mut any = false;
        for cell in cells.flatten() {
            any = true;
            let cell = cell.trim();
            if kind == ColumnKind::Integer && cell.parse::<i64>().is_err() {
                kind = ColumnKind::Float;
            }
            if kind == ColumnKind::Float && cell.parse::<f64>().is_err() {
                return ColumnKind::Text;
            }
        }
        if any {
            kind
        } else {
            ColumnKind::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Position in the source file, zero-based, excluding the header
    pub source_index: usize,
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(source_index: usize, cells: Vec<Option<String>>) -> Self {
        Self { source_index, cells }
    }

    pub fn has_missing(&self) -> bool {
        self.cells.iter().any(|c| c.is_none())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Build a table, inferring column kinds from the rows
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let kinds = (0..headers.len())
            .map(|i| {
                ColumnKind::infer(
                    rows.iter()
                        .map(|r| r.cells.get(i).and_then(|c| c.as_deref())),
                )
            })
            .collect();
        Self {
            headers,
            kinds,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but a missing column is a schema error
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| AnalysisError::missing_column(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.column_index(name).map(|i| self.kinds[i])
    }

    /// Same schema, different rows
    pub fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            headers: self.headers.clone(),
            kinds: self.kinds.clone(),
            rows,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a table from literal rows; "" becomes a missing cell
    pub fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                Row::new(
                    i,
                    cells
                        .iter()
                        .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                        .collect(),
                )
            })
            .collect();
        Table::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }
}
