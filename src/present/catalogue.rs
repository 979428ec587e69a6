//! The chart catalogue: one view per figure of the analysis.

use super::{BarMode, CategoryOrder, ChartKind, ChartSpec, View};
use crate::analysis::{revenue_points, Insights};
use crate::config::AnalysisConfig;
use crate::constants::{
    COL_APP, COL_CATEGORY, COL_CONTENT_RATING, COL_COUNT, COL_GENRE, COL_INSTALLS,
    COL_NUMBER_OF_APPS, COL_PRICE, COL_RATING, COL_REVENUE, COL_REVIEWS, COL_TOTAL_INSTALLS,
    COL_TYPE,
};
use crate::frame::Frame;
use crate::pipeline::CleanedCatalogue;
use crate::record::AppRecord;

fn counts_table(key: &str, value: &str, counts: &[(String, usize)]) -> Frame {
    let mut table = Frame::new(&[key, value]);
    for (k, n) in counts {
        table.push(vec![k.as_str().into(), (*n).into()]);
    }
    table
}

fn content_rating_views(insights: &Insights) -> Vec<View> {
    let table = counts_table(COL_CONTENT_RATING, COL_COUNT, &insights.content_rating_counts);
    vec![
        View::new(
            "content_rating_pie",
            ChartSpec::new(
                ChartKind::Pie,
                "Distribution of Content Ratings",
                COL_CONTENT_RATING,
                COL_COUNT,
            ),
            table.clone(),
        ),
        View::new(
            "content_rating_donut",
            ChartSpec::new(
                ChartKind::Pie,
                "Content Rating Distribution (Donut Chart)",
                COL_CONTENT_RATING,
                COL_COUNT,
            )
            .hole(0.4),
            table,
        ),
    ]
}

fn rating_vs_reviews(records: &[AppRecord]) -> View {
    let mut table = Frame::new(&[COL_APP, COL_CATEGORY, COL_RATING, COL_REVIEWS, COL_INSTALLS]);
    for r in records {
        table.push(vec![
            r.app.as_str().into(),
            r.category.as_str().into(),
            r.rating.into(),
            r.reviews.into(),
            r.installs.into(),
        ]);
    }
    View::new(
        "rating_vs_reviews",
        ChartSpec::new(
            ChartKind::Scatter,
            "Rating vs. Reviews by Category",
            COL_RATING,
            COL_REVIEWS,
        )
        .color(COL_CATEGORY)
        .size(COL_INSTALLS)
        .hover(COL_APP),
        table,
    )
}

fn category_views(insights: &Insights) -> Vec<View> {
    let apps_per_category =
        counts_table(COL_CATEGORY, COL_NUMBER_OF_APPS, &insights.category_counts);

    let mut avg_rating = Frame::new(&[COL_CATEGORY, COL_RATING]);
    for s in &insights.mean_rating_by_category {
        avg_rating.push(vec![s.category.as_str().into(), s.mean.into()]);
    }

    let mut downloads = Frame::new(&[COL_CATEGORY, COL_INSTALLS]);
    for s in &insights.installs_by_category {
        downloads.push(vec![s.category.as_str().into(), s.sum.into()]);
    }

    let mut concentration = Frame::new(&[COL_CATEGORY, COL_NUMBER_OF_APPS, COL_TOTAL_INSTALLS]);
    for c in &insights.concentration {
        concentration.push(vec![
            c.category.as_str().into(),
            c.apps.into(),
            c.total_installs.into(),
        ]);
    }

    vec![
        View::new(
            "apps_per_category",
            ChartSpec::new(
                ChartKind::Bar,
                "Number of Apps per Category",
                COL_CATEGORY,
                COL_NUMBER_OF_APPS,
            )
            .color(COL_NUMBER_OF_APPS)
            .category_order(CategoryOrder::TotalDescending),
            apps_per_category.clone(),
        ),
        View::new(
            "average_rating_by_category",
            ChartSpec::new(
                ChartKind::Bar,
                "Average App Rating by Category",
                COL_CATEGORY,
                COL_RATING,
            )
            .color(COL_RATING)
            .color_scale("Tealgrn")
            .category_order(CategoryOrder::TotalDescending),
            avg_rating,
        ),
        View::new(
            "category_competition",
            ChartSpec::new(
                ChartKind::Bar,
                "Vertical Bar Chart - Highest Competition by Category",
                COL_CATEGORY,
                COL_NUMBER_OF_APPS,
            )
            .color(COL_NUMBER_OF_APPS)
            .color_scale("Viridis")
            .axis_titles("App Category", "Number of Apps"),
            apps_per_category,
        ),
        View::new(
            "category_downloads",
            ChartSpec::new(
                ChartKind::Bar,
                "Horizontal Bar Chart - Most Popular Categories by Total Downloads",
                COL_INSTALLS,
                COL_CATEGORY,
            )
            .horizontal()
            .color(COL_INSTALLS)
            .color_scale("Aggrnyl")
            .axis_titles("Total Downloads", "App Category"),
            downloads,
        ),
        View::new(
            "category_concentration",
            ChartSpec::new(
                ChartKind::Scatter,
                "Category Concentration: Downloads vs Competition",
                COL_NUMBER_OF_APPS,
                COL_TOTAL_INSTALLS,
            )
            .color(COL_CATEGORY)
            .hover(COL_CATEGORY)
            .log_y()
            .axis_titles(
                "Number of Apps (Competition)",
                "Total Installs (Popularity - Log Scale)",
            ),
            concentration,
        ),
    ]
}

fn genre_competition(insights: &Insights) -> View {
    View::new(
        "genre_competition",
        ChartSpec::new(
            ChartKind::Bar,
            "Competition in Genres (Number of Apps)",
            COL_GENRE,
            COL_NUMBER_OF_APPS,
        )
        .color(COL_NUMBER_OF_APPS)
        .color_scale("Turbo")
        .axis_titles("Genre", "Number of Apps"),
        counts_table(COL_GENRE, COL_NUMBER_OF_APPS, &insights.genre_counts),
    )
}

fn free_vs_paid(insights: &Insights, records: &[AppRecord]) -> Vec<View> {
    let mut grouped = Frame::new(&[COL_CATEGORY, COL_TYPE, COL_NUMBER_OF_APPS]);
    for (category, app_type, n) in &insights.category_type_counts {
        grouped.push(vec![
            category.as_str().into(),
            app_type.as_str().into(),
            (*n).into(),
        ]);
    }

    let mut installs = Frame::new(&[COL_TYPE, COL_INSTALLS]);
    for r in records {
        installs.push(vec![r.app_type.as_str().into(), r.installs.into()]);
    }

    vec![
        View::new(
            "free_vs_paid_per_category",
            ChartSpec::new(
                ChartKind::Bar,
                "Free vs Paid Apps per Category",
                COL_CATEGORY,
                COL_NUMBER_OF_APPS,
            )
            .color(COL_TYPE)
            .bar_mode(BarMode::Group)
            .axis_titles("App Category", "Number of Apps"),
            grouped,
        ),
        View::new(
            "installs_by_type",
            ChartSpec::new(
                ChartKind::Box,
                "Box Plot - Lost Downloads for Paid Apps",
                COL_TYPE,
                COL_INSTALLS,
            )
            .color(COL_TYPE)
            .log_y()
            .axis_titles("App Type", "Number of Installs (Log Scale)"),
            installs,
        ),
    ]
}

fn paid_views(records: &[AppRecord], config: &AnalysisConfig) -> Vec<View> {
    let paid: Vec<&AppRecord> = records.iter().filter(|r| r.is_paid()).collect();

    let mut revenue = Frame::new(&[COL_CATEGORY, COL_REVENUE]);
    for (category, rev) in revenue_points(&paid, config.min_paid_apps_per_category) {
        revenue.push(vec![category.into(), rev.into()]);
    }

    let mut prices = Frame::new(&[COL_CATEGORY, COL_PRICE]);
    for r in paid.iter().filter(|r| r.price <= config.price_plot_cap) {
        prices.push(vec![r.category.as_str().into(), r.price.into()]);
    }

    vec![
        View::new(
            "revenue_by_category",
            ChartSpec::new(
                ChartKind::Box,
                "Box Plot - Estimated Revenue by App Category (Paid Apps Only)",
                COL_CATEGORY,
                COL_REVENUE,
            )
            .color(COL_CATEGORY)
            .log_y()
            .axis_titles("App Category", "Estimated Revenue (Log Scale)"),
            revenue,
        ),
        View::new(
            "price_by_category",
            ChartSpec::new(
                ChartKind::Box,
                "Box Plot - Paid App Prices by Category",
                COL_CATEGORY,
                COL_PRICE,
            )
            .color(COL_CATEGORY)
            .category_order(CategoryOrder::MaxDescending)
            .axis_titles("App Category", "Price ($)"),
            prices,
        ),
    ]
}

/// Build every chart view, in presentation order.
///
/// Aggregated charts read from `insights`; scatter and box charts carry the
/// raw points of the records within the price ceiling.
pub fn views(
    catalogue: &CleanedCatalogue,
    insights: &Insights,
    config: &AnalysisConfig,
) -> Vec<View> {
    let records = &catalogue.within_ceiling;

    let mut views = content_rating_views(insights);
    views.push(rating_vs_reviews(records));
    views.extend(category_views(insights));
    views.push(genre_competition(insights));
    views.extend(free_vs_paid(insights, records));
    views.extend(paid_views(records, config));
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CleaningReport;
    use crate::record::fixtures::{app, paid};

    fn catalogue() -> CleanedCatalogue {
        let mut records: Vec<AppRecord> = (0..5)
            .map(|i| paid(i, "Game", "GAME", 0.99 + i as f64, 10_000))
            .collect();
        records.push(app(5, "Notes", "PRODUCTIVITY"));
        records.push(paid(6, "Expensive", "MEDICAL", 150.0, 1_000));
        CleanedCatalogue {
            within_ceiling: records.clone(),
            records,
            report: CleaningReport::default(),
        }
    }

    #[test]
    fn test_every_view_binds_existing_columns() {
        let config = AnalysisConfig::default();
        let cat = catalogue();
        let insights = Insights::compute(&cat, &config);
        let views = views(&cat, &insights, &config);

        assert_eq!(views.len(), 13);
        for v in &views {
            v.spec.check_bindings(&v.table).unwrap();
        }

        let mut slugs: Vec<&str> = views.iter().map(|v| v.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), 13);
    }

    #[test]
    fn test_box_views_filter_points() {
        let config = AnalysisConfig::default();
        let cat = catalogue();
        let insights = Insights::compute(&cat, &config);
        let views = views(&cat, &insights, &config);

        let revenue = views.iter().find(|v| v.slug == "revenue_by_category").unwrap();
        assert_eq!(revenue.spec.kind, ChartKind::Box);
        assert_eq!(revenue.table.len(), 5);

        let prices = views.iter().find(|v| v.slug == "price_by_category").unwrap();
        assert_eq!(prices.table.len(), 5);

        let donut = views.iter().find(|v| v.slug == "content_rating_donut").unwrap();
        assert_eq!(donut.spec.hole, Some(0.4));
    }
}
