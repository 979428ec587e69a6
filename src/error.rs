use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to load '{}': {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AnalysisError {
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AnalysisError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_column(column: &str) -> Self {
        AnalysisError::Schema(format!("expected column '{}' is absent", column))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A raw field that a normalizer could not interpret.
///
/// Row-level parse failures are never fatal: the row is treated as holding a
/// missing value and the filtering stages drop it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{field} is empty")]
    Empty { field: &'static str },

    #[error("{field} value '{value}' is a non-numeric sentinel")]
    Sentinel { field: &'static str, value: String },

    #[error("{field} value '{value}' has an unrecognised unit suffix")]
    UnknownSuffix { field: &'static str, value: String },

    #[error("{field} value '{value}' is not a valid number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} value '{value}' is negative")]
    Negative { field: &'static str, value: String },

    #[error("{field} value '{value}' must be greater than zero")]
    NotPositive { field: &'static str, value: String },

    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown app type '{0}'")]
    UnknownAppType(String),
}

impl ParseError {
    /// Name of the column the failure came from
    pub fn field(&self) -> &'static str {
        match self {
            ParseError::Empty { field }
            | ParseError::Sentinel { field, .. }
            | ParseError::UnknownSuffix { field, .. }
            | ParseError::InvalidNumber { field, .. }
            | ParseError::Negative { field, .. }
            | ParseError::NotPositive { field, .. }
            | ParseError::OutOfRange { field, .. } => *field,
            ParseError::UnknownAppType(_) => crate::constants::COL_TYPE,
        }
    }
}
