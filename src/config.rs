use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{AnalysisError, Result};

/// Rule set for the cleaning and aggregation pipeline.
///
/// Every field has a default, so a config file only needs the values it
/// overrides:
///
/// ```toml
/// price_ceiling = 400.0
///
/// [listings]
/// most_expensive = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Columns removed before the sanitizer runs
    pub dropped_columns: Vec<String>,
    /// Size strings that carry no numeric size (case-insensitive)
    pub size_sentinels: Vec<String>,
    /// Cell contents read as a missing value
    pub missing_markers: Vec<String>,
    pub genre_delimiter: char,
    /// Rows priced above this are excluded from revenue analysis onward
    pub price_ceiling: f64,
    /// Paid apps priced above this are left out of the price box view
    pub price_plot_cap: f64,
    pub min_paid_apps_per_category: usize,
    pub listings: ListingConfig,
    pub logging: LoggingConfig,
}

/// How many rows each text listing shows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub top_rated: usize,
    pub largest: usize,
    pub most_reviewed: usize,
    pub most_expensive: usize,
    pub top_grossing: usize,
    pub genre_combinations: usize,
    pub top_genres: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when RUST_LOG is unset
    pub directive: String,
    /// Directory for daily-rotated JSON logs; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dropped_columns: constants::DEFAULT_DROPPED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            size_sentinels: constants::DEFAULT_SIZE_SENTINELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            missing_markers: constants::DEFAULT_MISSING_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            genre_delimiter: constants::DEFAULT_GENRE_DELIMITER,
            price_ceiling: constants::DEFAULT_PRICE_CEILING,
            price_plot_cap: constants::DEFAULT_PRICE_PLOT_CAP,
            min_paid_apps_per_category: constants::DEFAULT_MIN_PAID_APPS_PER_CATEGORY,
            listings: ListingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            top_rated: 5,
            largest: 5,
            most_reviewed: 5,
            most_expensive: 20,
            top_grossing: 10,
            genre_combinations: 10,
            top_genres: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: "playstore_insights=info".to_string(),
            log_dir: None,
        }
    }
}

impl AnalysisConfig {
    /// Load a config file, falling back to defaults for every absent key
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: AnalysisConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.price_ceiling.is_finite() || self.price_ceiling <= 0.0 {
            return Err(AnalysisError::Config(format!(
                "price_ceiling must be a positive number, got {}",
                self.price_ceiling
            )));
        }
        if !self.price_plot_cap.is_finite() || self.price_plot_cap <= 0.0 {
            return Err(AnalysisError::Config(format!(
                "price_plot_cap must be a positive number, got {}",
                self.price_plot_cap
            )));
        }
        if self.genre_delimiter.is_whitespace() {
            return Err(AnalysisError::Config(
                "genre_delimiter must not be whitespace".to_string(),
            ));
        }
        if self.size_sentinels.iter().any(|s| s.trim().is_empty()) {
            return Err(AnalysisError::Config(
                "size_sentinels must not contain blank entries".to_string(),
            ));
        }
        for column in &self.dropped_columns {
            if constants::REQUIRED_COLUMNS.contains(&column.as_str()) {
                return Err(AnalysisError::Config(format!(
                    "column '{}' is required by the analysis and cannot be dropped",
                    column
                )));
            }
        }
        Ok(())
    }
}
