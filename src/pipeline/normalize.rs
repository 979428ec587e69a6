//! Field normalizers and the typed parse stage.
//!
//! Each normalizer is a pure `&str -> Result<_, ParseError>`. A `ParseError`
//! marks the field as missing; the stages below drop the row and count why.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use crate::config::AnalysisConfig;
use crate::constants::{
    COL_APP, COL_CATEGORY, COL_CONTENT_RATING, COL_GENRES, COL_INSTALLS, COL_PRICE, COL_RATING,
    COL_REVIEWS, COL_SIZE, COL_TYPE,
};
use crate::error::{AnalysisError, ParseError, Result};
use crate::metrics::{self, MetricName};
use crate::record::{AppRecord, AppType};
use crate::table::{Row, Table};

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<num>\d+(?:\.\d+)?|\.\d+)(?P<unit>[A-Za-z]*)$").expect("valid size pattern")
});

const CURRENCY_SYMBOLS: [char; 8] = ['$', '€', '£', '¥', '₹', '₩', '₽', '¢'];

const MAX_RATING: f64 = 5.0;

/// Parse a size such as "19M" or "201k" into megabytes.
///
/// Sentinels (case-insensitive), unknown unit suffixes and zero sizes are
/// all errors.
pub fn parse_size<S: AsRef<str>>(raw: &str, sentinels: &[S]) -> std::result::Result<f64, ParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ParseError::Empty { field: COL_SIZE });
    }
    if sentinels
        .iter()
        .any(|s| s.as_ref().trim().eq_ignore_ascii_case(value))
    {
        return Err(ParseError::Sentinel {
            field: COL_SIZE,
            value: value.to_string(),
        });
    }

    let caps = SIZE_PATTERN
        .captures(value)
        .ok_or_else(|| ParseError::InvalidNumber {
            field: COL_SIZE,
            value: value.to_string(),
        })?;

    let magnitude: f64 = caps["num"].parse().map_err(|_| ParseError::InvalidNumber {
        field: COL_SIZE,
        value: value.to_string(),
    })?;

    let megabytes = match &caps["unit"] {
        "M" | "m" => magnitude,
        "K" | "k" => magnitude / 1024.0,
        _ => {
            return Err(ParseError::UnknownSuffix {
                field: COL_SIZE,
                value: value.to_string(),
            })
        }
    };

    if megabytes <= 0.0 || !megabytes.is_finite() {
        return Err(ParseError::NotPositive {
            field: COL_SIZE,
            value: value.to_string(),
        });
    }
    Ok(megabytes)
}

/// Parse an install band such as "10,000+"
pub fn parse_installs(raw: &str) -> std::result::Result<u64, ParseError> {
    let value = raw.trim();
    let digits: String = value
        .strip_suffix('+')
        .unwrap_or(value)
        .chars()
        .filter(|c| *c != ',')
        .collect();

    if digits.is_empty() {
        return Err(ParseError::Empty {
            field: COL_INSTALLS,
        });
    }
    digits.parse::<u64>().map_err(|_| ParseError::InvalidNumber {
        field: COL_INSTALLS,
        value: value.to_string(),
    })
}

/// Canonical display form of an install count, e.g. 10000 -> "10,000+"
pub fn format_installs(installs: u64) -> String {
    let digits = installs.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('+');
    out
}

/// Parse a price such as "$4.99". A bare symbol or "0" is free.
pub fn parse_price(raw: &str) -> std::result::Result<f64, ParseError> {
    let value = raw.trim();
    let amount = match value.chars().next() {
        Some(c) if CURRENCY_SYMBOLS.contains(&c) => value[c.len_utf8()..].trim(),
        _ => value,
    };

    if amount.is_empty() {
        return Ok(0.0);
    }
    if amount.starts_with('+') {
        return Err(ParseError::InvalidNumber {
            field: COL_PRICE,
            value: value.to_string(),
        });
    }

    let price: f64 = amount.parse().map_err(|_| ParseError::InvalidNumber {
        field: COL_PRICE,
        value: value.to_string(),
    })?;

    if !price.is_finite() {
        return Err(ParseError::InvalidNumber {
            field: COL_PRICE,
            value: value.to_string(),
        });
    }
    if price < 0.0 {
        return Err(ParseError::Negative {
            field: COL_PRICE,
            value: value.to_string(),
        });
    }
    // "-0" parses to negative zero
    if price == 0.0 {
        return Ok(0.0);
    }
    Ok(price)
}

pub fn parse_rating(raw: &str) -> std::result::Result<f64, ParseError> {
    let value = raw.trim();
    let rating: f64 = value.parse().map_err(|_| ParseError::InvalidNumber {
        field: COL_RATING,
        value: value.to_string(),
    })?;
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ParseError::OutOfRange {
            field: COL_RATING,
            value: rating,
            min: 0.0,
            max: MAX_RATING,
        });
    }
    Ok(rating)
}

pub fn parse_reviews(raw: &str) -> std::result::Result<u64, ParseError> {
    let value = raw.trim();
    value.parse::<u64>().map_err(|_| ParseError::InvalidNumber {
        field: COL_REVIEWS,
        value: value.to_string(),
    })
}

pub fn parse_app_type(raw: &str) -> std::result::Result<AppType, ParseError> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("free") {
        Ok(AppType::Free)
    } else if value.eq_ignore_ascii_case("paid") {
        Ok(AppType::Paid)
    } else {
        Err(ParseError::UnknownAppType(value.to_string()))
    }
}

/// Positions of the columns the record parser reads
#[derive(Debug, Clone, Copy)]
struct Columns {
    app: usize,
    category: usize,
    rating: usize,
    reviews: usize,
    size: usize,
    installs: usize,
    app_type: usize,
    price: usize,
    content_rating: usize,
    genres: usize,
}

impl Columns {
    fn resolve(table: &Table) -> Result<Self> {
        Ok(Self {
            app: table.require_column(COL_APP)?,
            category: table.require_column(COL_CATEGORY)?,
            rating: table.require_column(COL_RATING)?,
            reviews: table.require_column(COL_REVIEWS)?,
            size: table.require_column(COL_SIZE)?,
            installs: table.require_column(COL_INSTALLS)?,
            app_type: table.require_column(COL_TYPE)?,
            price: table.require_column(COL_PRICE)?,
            content_rating: table.require_column(COL_CONTENT_RATING)?,
            genres: table.require_column(COL_GENRES)?,
        })
    }
}

/// Fail with a `SchemaError` if any column the analysis reads is absent
pub fn check_schema(table: &Table) -> Result<()> {
    Columns::resolve(table).map(|_| ())
}

fn cell<'a>(row: &'a Row, idx: usize, field: &'static str) -> std::result::Result<&'a str, ParseError> {
    match row.cells.get(idx).and_then(|c| c.as_deref()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim()),
        _ => Err(ParseError::Empty { field }),
    }
}

fn parse_genres(raw: &str, delimiter: char) -> std::result::Result<&str, ParseError> {
    if raw.split(delimiter).any(|g| !g.trim().is_empty()) {
        Ok(raw)
    } else {
        Err(ParseError::Empty { field: COL_GENRES })
    }
}

/// Parse every field of a row independently.
///
/// On failure all field errors are returned, in column order with Size
/// first, so callers can see every column a row breaks.
fn parse_row(
    row: &Row,
    cols: &Columns,
    config: &AnalysisConfig,
) -> std::result::Result<AppRecord, Vec<ParseError>> {
    let size_mb = cell(row, cols.size, COL_SIZE).and_then(|raw| parse_size(raw, &config.size_sentinels));
    let genres = cell(row, cols.genres, COL_GENRES)
        .and_then(|raw| parse_genres(raw, config.genre_delimiter));
    let app = cell(row, cols.app, COL_APP);
    let category = cell(row, cols.category, COL_CATEGORY);
    let rating = cell(row, cols.rating, COL_RATING).and_then(parse_rating);
    let reviews = cell(row, cols.reviews, COL_REVIEWS).and_then(parse_reviews);
    let installs = cell(row, cols.installs, COL_INSTALLS).and_then(parse_installs);
    let app_type = cell(row, cols.app_type, COL_TYPE).and_then(parse_app_type);
    let price = cell(row, cols.price, COL_PRICE).and_then(parse_price);
    let content_rating = cell(row, cols.content_rating, COL_CONTENT_RATING);

    match (
        size_mb,
        genres,
        app,
        category,
        rating,
        reviews,
        installs,
        app_type,
        price,
        content_rating,
    ) {
        (
            Ok(size_mb),
            Ok(genres),
            Ok(app),
            Ok(category),
            Ok(rating),
            Ok(reviews),
            Ok(installs),
            Ok(app_type),
            Ok(price),
            Ok(content_rating),
        ) => Ok(AppRecord {
            id: row.source_index,
            app: app.to_string(),
            category: category.to_string(),
            rating,
            reviews,
            size_mb,
            installs,
            app_type,
            price,
            content_rating: content_rating.to_string(),
            genres: genres.to_string(),
        }),
        (
            size_mb,
            genres,
            app,
            category,
            rating,
            reviews,
            installs,
            app_type,
            price,
            content_rating,
        ) => Err([
            size_mb.err(),
            genres.err(),
            app.err(),
            category.err(),
            rating.err(),
            reviews.err(),
            installs.err(),
            app_type.err(),
            price.err(),
            content_rating.err(),
        ]
        .into_iter()
        .flatten()
        .collect()),
    }
}

fn unparsable_column(field: &str, rows: usize) -> AnalysisError {
    AnalysisError::Schema(format!(
        "column '{}' could not be parsed in any of {} rows",
        field, rows
    ))
}

/// Drop rows whose Size does not parse, sentinel values included.
///
/// Runs after the sanitizer: a sentinel is a present, non-missing string at
/// load time, so only this pass can remove it.
#[instrument(skip(table, config), fields(rows = table.len()))]
pub fn filter_sizes(table: &Table, config: &AnalysisConfig) -> Result<(Table, usize)> {
    let size = table.require_column(COL_SIZE)?;
    let rows: Vec<Row> = table
        .rows
        .iter()
        .filter(|row| {
            let parsed = cell(row, size, COL_SIZE)
                .and_then(|raw| parse_size(raw, &config.size_sentinels));
            match parsed {
                Ok(_) => true,
                Err(e) => {
                    debug!("Dropping row {}: {}", row.source_index, e);
                    false
                }
            }
        })
        .cloned()
        .collect();

    let dropped = table.len() - rows.len();
    if !table.is_empty() && rows.is_empty() {
        return Err(unparsable_column(COL_SIZE, table.len()));
    }
    info!("Size filter: {} rows kept, {} dropped", rows.len(), dropped);
    metrics::record(MetricName::RowsSizeDropped, dropped);
    Ok((table.with_rows(rows), dropped))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeStats {
    pub rejected: usize,
    /// Rejections keyed by the first column that failed to parse
    pub rejected_by_field: BTreeMap<&'static str, usize>,
}

/// Parse every row into an `AppRecord`, dropping rows with unparsable fields.
///
/// A row is counted under the first column that failed. When some column
/// fails in every row, whatever else each row breaks, the column itself is
/// malformed and the run aborts with a `SchemaError`.
#[instrument(skip(table, config), fields(rows = table.len()))]
pub fn normalize(table: &Table, config: &AnalysisConfig) -> Result<(Vec<AppRecord>, NormalizeStats)> {
    let cols = Columns::resolve(table)?;
    let mut records = Vec::with_capacity(table.len());
    let mut stats = NormalizeStats::default();

    // Failures per column over all rows, not only the first per row
    let mut failures: BTreeMap<&'static str, usize> = BTreeMap::new();

    for row in &table.rows {
        match parse_row(row, &cols, config) {
            Ok(record) => records.push(record),
            Err(errors) => {
                for e in &errors {
                    *failures.entry(e.field()).or_insert(0) += 1;
                }
                if let Some(first) = errors.first() {
                    debug!("Rejecting row {}: {}", row.source_index, first);
                    metrics::record_rejection(first.field());
                    *stats.rejected_by_field.entry(first.field()).or_insert(0) += 1;
                }
                stats.rejected += 1;
            }
        }
    }

    if !table.is_empty() {
        if let Some((field, _)) = failures.iter().find(|(_, n)| **n == table.len()) {
            return Err(unparsable_column(field, table.len()));
        }
    }

    if stats.rejected > 0 {
        warn!(
            "Rejected {} rows with unparsable fields: {:?}",
            stats.rejected, stats.rejected_by_field
        );
    }
    info!("Normalized {} records", records.len());
    metrics::record(MetricName::RowsCleaned, records.len());
    Ok((records, stats))
}

/// Keep records priced at or below the ceiling
pub fn apply_price_ceiling(records: &[AppRecord], ceiling: f64) -> (Vec<AppRecord>, usize) {
    let kept: Vec<AppRecord> = records
        .iter()
        .filter(|r| r.price <= ceiling)
        .cloned()
        .collect();
    let excluded = records.len() - kept.len();
    if excluded > 0 {
        info!("Excluded {} apps priced above {}", excluded, ceiling);
    }
    metrics::record(MetricName::RowsAbovePriceCeiling, excluded);
    (kept, excluded)
}
