use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

use playstore_insights::analysis::Insights;
use playstore_insights::config::AnalysisConfig;
use playstore_insights::constants::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_DIR};
use playstore_insights::logging;
use playstore_insights::pipeline::{CleanedCatalogue, Pipeline};
use playstore_insights::present::{self, catalogue, JsonPresenter, TextPresenter};
use playstore_insights::report;

#[derive(Parser)]
#[command(name = "playstore_insights")]
#[command(about = "Clean and summarize a Google Play Store app catalogue")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Catalogue CSV file
    #[arg(default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,
    /// TOML file overriding the default cleaning and listing rules
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartFormat {
    /// One JSON document per chart under the output directory
    Json,
    /// Chart tables printed to stdout
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cleaning summary and every text listing
    Report {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print only the cleaning summary
    Clean {
        #[command(flatten)]
        input: InputArgs,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the chart catalogue
    Charts {
        #[command(flatten)]
        input: InputArgs,
        /// Directory for chart artifacts
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: ChartFormat,
    },
}

fn prepare(args: &InputArgs) -> anyhow::Result<(AnalysisConfig, CleanedCatalogue)> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())
        .context("Failed to load analysis config")?;
    let pipeline = Pipeline::new(config);
    let cleaned = pipeline
        .run(&args.input)
        .with_context(|| format!("Failed to clean '{}'", args.input.display()))?;
    Ok((pipeline.config().clone(), cleaned))
}

/// Config is needed before logging starts, so it is read once up front
fn logging_config(command: &Commands) -> AnalysisConfig {
    let input = match command {
        Commands::Report { input } => input,
        Commands::Clean { input, .. } => input,
        Commands::Charts { input, .. } => input,
    };
    AnalysisConfig::load_or_default(input.config.as_deref()).unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let _guard = logging::init_logging(&logging_config(&cli.command).logging);

    let stdout = io::stdout();
    match cli.command {
        Commands::Report { input } => {
            let (config, cleaned) = prepare(&input)?;
            let insights = Insights::compute(&cleaned, &config);

            let mut out = stdout.lock();
            writeln!(out, "== Cleaning summary ==")?;
            writeln!(out, "{}", cleaned.report)?;
            for section in report::build(&insights, &config.listings) {
                writeln!(out, "{}", section)?;
            }
        }
        Commands::Clean { input, json } => {
            let (_, cleaned) = prepare(&input)?;
            let mut out = stdout.lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &cleaned.report)?;
                writeln!(out)?;
            } else {
                write!(out, "{}", cleaned.report)?;
            }
        }
        Commands::Charts {
            input,
            output_dir,
            format,
        } => {
            let (config, cleaned) = prepare(&input)?;
            let insights = Insights::compute(&cleaned, &config);
            let views = catalogue::views(&cleaned, &insights, &config);

            let written = match format {
                ChartFormat::Json => {
                    let mut presenter = JsonPresenter::new(&output_dir).with_context(|| {
                        format!("Failed to create output directory '{}'", output_dir.display())
                    })?;
                    present::present_all(&mut presenter, &views)?
                }
                ChartFormat::Text => {
                    let mut presenter = TextPresenter::new(stdout.lock());
                    present::present_all(&mut presenter, &views)?
                }
            };
            info!("Presented {} chart views", written);
        }
    }

    Ok(())
}
