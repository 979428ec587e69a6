//! Derived views over the cleaned catalogue.
//!
//! Everything here is a pure function of the records it is given. `Insights`
//! computes the full set once so the text report and the chart catalogue
//! read the same numbers.

pub mod genres;
pub mod grouping;
pub mod ranking;
pub mod stats;

use serde::Serialize;
use tracing::{instrument, warn};

use crate::config::AnalysisConfig;
use crate::constants::{BILLION_INSTALLS, GAME_CATEGORY_MARKER};
use crate::pipeline::CleanedCatalogue;
use crate::record::{AppRecord, AppType, NumericColumn};

pub use genres::{GenrePair, GenreTable};
pub use grouping::{CategoryStats, Concentration};
pub use ranking::RevenueEntry;
pub use stats::BoxSummary;

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub billion_install_apps: usize,
    pub single_install_apps: usize,

    pub top_rated: Vec<AppRecord>,
    pub largest: Vec<AppRecord>,
    pub most_reviewed: Vec<AppRecord>,
    pub most_expensive: Vec<AppRecord>,

    pub top_grossing: Vec<RevenueEntry>,
    pub games_in_top_grossing: usize,

    pub content_rating_counts: Vec<(String, usize)>,
    pub category_counts: Vec<(String, usize)>,
    /// Highest mean rating first
    pub mean_rating_by_category: Vec<CategoryStats>,
    /// Fewest total installs first, for a horizontal bar
    pub installs_by_category: Vec<CategoryStats>,
    pub concentration: Vec<Concentration>,

    pub genre_combinations: Vec<(String, usize)>,
    pub genre_counts: Vec<(String, usize)>,
    pub unique_genres: usize,
    pub multi_genre_apps: usize,

    pub category_type_counts: Vec<(String, AppType, usize)>,
    pub installs_by_type: Vec<(AppType, BoxSummary)>,
    pub revenue_by_category: Vec<(String, BoxSummary)>,
    /// Highest maximum price first
    pub price_by_category: Vec<(String, BoxSummary)>,
    pub median_paid_price: Option<f64>,
}

impl Insights {
    /// Compute every view.
    ///
    /// Listings of the whole catalogue use every cleaned record; revenue and
    /// the views after it only see records within the price ceiling.
    #[instrument(skip_all, fields(records = catalogue.records.len()))]
    pub fn compute(catalogue: &CleanedCatalogue, config: &AnalysisConfig) -> Self {
        let all = &catalogue.records;
        let priced = &catalogue.within_ceiling;
        let listings = &config.listings;

        let top_grossing: Vec<RevenueEntry> = ranking::revenue_ranking(priced)
            .into_iter()
            .take(listings.top_grossing)
            .collect();
        let games_in_top_grossing = top_grossing
            .iter()
            .filter(|e| e.record.category.contains(GAME_CATEGORY_MARKER))
            .count();

        let mut mean_rating_by_category = grouping::by_category(priced, NumericColumn::Rating);
        mean_rating_by_category.sort_by(|a, b| b.mean.total_cmp(&a.mean));

        let mut installs_by_category = grouping::by_category(priced, NumericColumn::Installs);
        installs_by_category.sort_by(|a, b| a.sum.total_cmp(&b.sum));

        let genre_table = GenreTable::build(priced, config.genre_delimiter);

        let paid: Vec<&AppRecord> = priced.iter().filter(|r| r.is_paid()).collect();
        let paid_prices: Vec<f64> = paid.iter().map(|r| r.price).collect();

        let revenue_by_category = revenue_boxes(&paid, config.min_paid_apps_per_category);
        if !paid.is_empty() && revenue_by_category.is_empty() {
            warn!(
                "No category has {} or more revenue-earning paid apps; revenue box view is empty",
                config.min_paid_apps_per_category
            );
        }

        let mut price_by_category = stats::box_by_group(
            paid.iter()
                .filter(|r| r.price <= config.price_plot_cap)
                .map(|r| (r.category.clone(), r.price)),
        );
        price_by_category.sort_by(|a, b| b.1.max.total_cmp(&a.1.max));

        Self {
            billion_install_apps: all.iter().filter(|r| r.installs >= BILLION_INSTALLS).count(),
            single_install_apps: all.iter().filter(|r| r.installs == 1).count(),

            top_rated: owned(ranking::top_n_by(all, NumericColumn::Rating, listings.top_rated)),
            largest: owned(ranking::top_n_by(all, NumericColumn::SizeMb, listings.largest)),
            most_reviewed: owned(ranking::top_n_by(
                all,
                NumericColumn::Reviews,
                listings.most_reviewed,
            )),
            most_expensive: owned(ranking::top_n_by(
                all,
                NumericColumn::Price,
                listings.most_expensive,
            )),

            top_grossing,
            games_in_top_grossing,

            content_rating_counts: grouping::value_counts(
                priced.iter().map(|r| r.content_rating.as_str()),
            ),
            category_counts: grouping::value_counts(priced.iter().map(|r| r.category.as_str())),
            mean_rating_by_category,
            installs_by_category,
            concentration: grouping::category_concentration(priced),

            genre_combinations: genres::combination_counts(priced)
                .into_iter()
                .take(listings.genre_combinations)
                .collect(),
            genre_counts: genre_table.counts(),
            unique_genres: genre_table.unique_genres(),
            multi_genre_apps: genre_table.multi_genre_apps(),

            category_type_counts: grouping::count_by_category_and_type(priced),
            installs_by_type: stats::box_by_group(
                priced.iter().map(|r| (r.app_type, r.installs as f64)),
            ),
            revenue_by_category,
            price_by_category,
            median_paid_price: stats::median(&paid_prices),
        }
    }
}

fn owned(records: Vec<&AppRecord>) -> Vec<AppRecord> {
    records.into_iter().cloned().collect()
}

/// Paid apps with positive revenue, grouped by category, keeping only
/// categories with at least `min_apps` such apps
pub fn revenue_points<'a>(paid: &[&'a AppRecord], min_apps: usize) -> Vec<(&'a str, f64)> {
    let earning: Vec<(&str, f64)> = paid
        .iter()
        .filter_map(|r| {
            r.revenue_estimate()
                .filter(|rev| *rev > 0.0)
                .map(|rev| (r.category.as_str(), rev))
        })
        .collect();

    let counts = grouping::value_counts(earning.iter().map(|(c, _)| *c));
    earning
        .into_iter()
        .filter(|(c, _)| counts.iter().any(|(k, n)| k == c && *n >= min_apps))
        .collect()
}

fn revenue_boxes(paid: &[&AppRecord], min_apps: usize) -> Vec<(String, BoxSummary)> {
    stats::box_by_group(
        revenue_points(paid, min_apps)
            .into_iter()
            .map(|(c, rev)| (c.to_string(), rev)),
    )
}
