use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use playstore_insights::analysis::ranking::top_n_by;
use playstore_insights::analysis::Insights;
use playstore_insights::config::AnalysisConfig;
use playstore_insights::error::AnalysisError;
use playstore_insights::pipeline::Pipeline;
use playstore_insights::present::{self, catalogue, JsonPresenter};
use playstore_insights::record::NumericColumn;

const HEADER: &str = "App,Category,Rating,Reviews,Size,Installs,Type,Price,Content Rating,Genres,Last Updated,Current Ver,Android Ver";

const FIVE_ROWS: &str = r#"Photo Editor & Candy Camera & Grid & ScrapBook,ART_AND_DESIGN,4.1,159,19M,"10,000+",Free,0,Everyone,Art & Design,"January 7, 2018",1.0.0,4.0.3 and up
Coloring book moana,ART_AND_DESIGN,3.9,967,14M,"500,000+",Free,0,Everyone,Art & Design;Pretend Play,"January 15, 2018",2.0.0,4.0.3 and up
U Launcher Lite,ART_AND_DESIGN,4.7,87510,8.7M,"5,000,000+",Free,0,Everyone,Art & Design,"August 1, 2018",1.2.4,4.0.3 and up
Sketch - Draw & Paint,ART_AND_DESIGN,4.5,215644,25M,"50,000,000+",Free,0,Teen,Art & Design,"June 8, 2018",Varies with device,4.2 and up
Pixel Draw,ART_AND_DESIGN,4.9,967,Varies with device,"100,000,000+",Free,0,Everyone,Art & Design;Creativity,"June 20, 2018",1.1,4.4 and up
"#;

fn write_catalogue(dir: &TempDir, body: &str) -> Result<PathBuf> {
    let path = dir.path().join("googleplaystore.csv");
    fs::write(&path, format!("{}\n{}", HEADER, body))?;
    Ok(path)
}

#[test]
fn test_five_row_fixture_drops_unsized_app() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_catalogue(&dir, FIVE_ROWS)?;

    let cleaned = Pipeline::new(AnalysisConfig::default()).run(&path)?;
    assert_eq!(cleaned.report.rows_loaded, 5);
    assert_eq!(cleaned.report.size_dropped, 1);
    assert_eq!(cleaned.records.len(), 4);
    assert!(cleaned.records.iter().all(|r| r.app != "Pixel Draw"));

    let by_installs = top_n_by(&cleaned.records, NumericColumn::Installs, 1);
    assert_eq!(by_installs[0].app, "Sketch - Draw & Paint");
    assert_eq!(by_installs[0].installs, 50_000_000);

    let by_rating = top_n_by(&cleaned.records, NumericColumn::Rating, 1);
    assert_eq!(by_rating[0].app, "U Launcher Lite");
    Ok(())
}

#[test]
fn test_cleaned_rows_are_complete_and_distinct() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let body = format!(
        "{}{}{}",
        FIVE_ROWS,
        "U Launcher Lite,ART_AND_DESIGN,4.7,87510,8.7M,\"5,000,000+\",Free,0,Everyone,Art & Design,\"August 1, 2018\",1.2.4,4.0.3 and up\n",
        "No Rating,TOOLS,NaN,10,1.5M,\"1,000+\",Free,0,Everyone,Tools,\"May 1, 2018\",1.0,4.1 and up\n",
    );
    let path = write_catalogue(&dir, &body)?;

    let cleaned = Pipeline::new(AnalysisConfig::default()).run(&path)?;
    assert_eq!(cleaned.report.duplicates_dropped, 1);
    assert_eq!(cleaned.report.missing_dropped, 1);
    assert_eq!(cleaned.records.len(), 4);

    for (i, a) in cleaned.records.iter().enumerate() {
        for b in &cleaned.records[i + 1..] {
            assert_ne!((a.app.as_str(), a.installs), (b.app.as_str(), b.installs));
        }
    }
    Ok(())
}

#[test]
fn test_missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Pipeline::new(AnalysisConfig::default())
        .run(&dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Load { .. }));
}

#[test]
fn test_missing_column_is_a_schema_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("narrow.csv");
    fs::write(&path, "App,Category,Rating\nChess,BOARD,4.5\n")?;

    let err = Pipeline::new(AnalysisConfig::default())
        .run(&path)
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Schema(_)));
    Ok(())
}

#[test]
fn test_paid_revenue_and_price_ceiling() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let body = concat!(
        "Minecraft,FAMILY,4.5,2376564,Varies with device,\"10,000,000+\",Paid,$6.99,Everyone 10+,Arcade;Action & Adventure,\"July 24, 2018\",1.5.2.1,Varies with device\n",
        "Hitman Sniper,GAME,4.6,408292,29M,\"10,000,000+\",Paid,$0.99,Mature 17+,Action,\"July 12, 2018\",1.7.110758,4.1 and up\n",
        "I'm Rich - Trump Edition,LIFESTYLE,3.6,275,7.3M,\"10,000+\",Paid,$400.00,Everyone,Lifestyle,\"May 3, 2018\",1.0.1,4.1 and up\n",
        "Facetune,PHOTOGRAPHY,4.4,49553,48M,\"1,000,000+\",Paid,$5.99,Everyone,Photography,\"July 25, 2018\",1.0,4.1 and up\n",
    );
    let path = write_catalogue(&dir, body)?;

    let config = AnalysisConfig::default();
    let cleaned = Pipeline::new(config.clone()).run(&path)?;
    assert_eq!(cleaned.records.len(), 3);
    assert_eq!(cleaned.report.above_price_ceiling, 1);

    let insights = Insights::compute(&cleaned, &config);
    assert_eq!(insights.most_expensive[0].app, "I'm Rich - Trump Edition");

    let names: Vec<&str> = insights
        .top_grossing
        .iter()
        .map(|e| e.record.app.as_str())
        .collect();
    assert_eq!(names, vec!["Hitman Sniper", "Facetune"]);
    assert_eq!(insights.top_grossing[0].revenue, 0.99 * 10_000_000.0);
    assert_eq!(insights.games_in_top_grossing, 1);
    Ok(())
}

#[test]
fn test_chart_catalogue_writes_json_per_view() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_catalogue(&dir, FIVE_ROWS)?;

    let config = AnalysisConfig::default();
    let cleaned = Pipeline::new(config.clone()).run(&path)?;
    let insights = Insights::compute(&cleaned, &config);
    let views = catalogue::views(&cleaned, &insights, &config);

    let out_dir = dir.path().join("charts");
    let mut presenter = JsonPresenter::new(&out_dir)?;
    let written = present::present_all(&mut presenter, &views)?;
    assert_eq!(written, views.len());
    assert_eq!(fs::read_dir(&out_dir)?.count(), views.len());

    let pie: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("content_rating_pie.json"))?)?;
    assert_eq!(pie["spec"]["kind"], "pie");
    assert_eq!(pie["table"]["rows"][0][0], "Everyone");
    assert_eq!(pie["table"]["rows"][0][1], 3);
    Ok(())
}
