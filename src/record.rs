use serde::Serialize;
use std::fmt;

use crate::constants;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AppType {
    Free,
    Paid,
}

impl AppType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Free => "Free",
            AppType::Paid => "Paid",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaned catalogue row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRecord {
    /// Row position in the source file; stable identity for ties and genre pairs
    pub id: usize,
    pub app: String,
    pub category: String,
    pub rating: f64,
    pub reviews: u64,
    pub size_mb: f64,
    pub installs: u64,
    pub app_type: AppType,
    pub price: f64,
    pub content_rating: String,
    /// Raw delimited genre list, e.g. "Art & Design;Creativity"
    pub genres: String,
}

impl AppRecord {
    /// price × installs, only defined for paid apps
    pub fn revenue_estimate(&self) -> Option<f64> {
        match self.app_type {
            AppType::Paid => Some(self.price * self.installs as f64),
            AppType::Free => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.app_type == AppType::Paid
    }

    /// Individual genres; empty segments are skipped
    pub fn genre_list(&self, delimiter: char) -> impl Iterator<Item = &str> {
        self.genres
            .split(delimiter)
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    pub fn value(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Rating => self.rating,
            NumericColumn::Reviews => self.reviews as f64,
            NumericColumn::SizeMb => self.size_mb,
            NumericColumn::Installs => self.installs as f64,
            NumericColumn::Price => self.price,
        }
    }
}

/// Numeric columns available to ranking and grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Rating,
    Reviews,
    SizeMb,
    Installs,
    Price,
}

impl NumericColumn {
    pub fn label(&self) -> &'static str {
        match self {
            NumericColumn::Rating => constants::COL_RATING,
            NumericColumn::Reviews => constants::COL_REVIEWS,
            NumericColumn::SizeMb => constants::COL_SIZE_MB,
            NumericColumn::Installs => constants::COL_INSTALLS,
            NumericColumn::Price => constants::COL_PRICE,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A free app with plausible defaults; tests override what they care about
    pub fn app(id: usize, name: &str, category: &str) -> AppRecord {
        AppRecord {
            id,
            app: name.to_string(),
            category: category.to_string(),
            rating: 4.0,
            reviews: 100,
            size_mb: 10.0,
            installs: 1_000,
            app_type: AppType::Free,
            price: 0.0,
            content_rating: "Everyone".to_string(),
            genres: "Tools".to_string(),
        }
    }

    pub fn paid(id: usize, name: &str, category: &str, price: f64, installs: u64) -> AppRecord {
        AppRecord {
            app_type: AppType::Paid,
            price,
            installs,
            ..app(id, name, category)
        }
    }
}
