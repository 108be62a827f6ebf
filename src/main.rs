//! Trendcast - workout performance trend projection
//!
//! Command line entry point: reads samples (or activity records) from a JSON
//! file, fits the trend and reports when the goal is reached.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trendcast::storage::config::{load_config, load_config_from};
use trendcast::trends::{
    ActivityRecord, AnalysisOptions, ExtractOptions, RawSample, SampleExtractor, TrendAnalyzer,
};

/// Fit a performance trend and project when a goal is reached.
#[derive(Debug, Parser)]
#[command(name = "trendcast", version, about)]
struct Cli {
    /// JSON file with samples (`[{"timestamp": ..., "value": ...}]`) or records
    input: PathBuf,

    /// Target value to reach
    #[arg(long, allow_negative_numbers = true)]
    goal: f64,

    /// Also estimate the metric at this RFC 3339 date
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Input holds activity records instead of samples
    #[arg(long)]
    records: bool,

    /// Only use records of this routine
    #[arg(long, requires = "records")]
    routine: Option<String>,

    /// Normalize record rates to this distance
    #[arg(long, requires = "records")]
    target_distance: Option<f64>,

    /// Only use records that set a new best
    #[arg(long, requires = "records")]
    personal_bests: bool,

    /// Configuration file (defaults to the user data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full analysis as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Trendcast v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => load_config().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default configuration: {}", e);
            Default::default()
        }),
    };

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let samples: Vec<RawSample> = if cli.records {
        let records: Vec<ActivityRecord> =
            serde_json::from_str(&content).context("input is not a list of activity records")?;
        let options = ExtractOptions {
            routine: cli.routine.clone(),
            target_distance: cli.target_distance,
            personal_bests_only: cli.personal_bests,
        };
        SampleExtractor::from_config(&config).extract(&records, &options)
    } else {
        serde_json::from_str(&content).context("input is not a list of samples")?
    };

    let analyzer = TrendAnalyzer::new(config)?;
    let options = AnalysisOptions { project_at: cli.at };
    let analysis = analyzer.analyze(&samples, cli.goal, &options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("{}", analysis.summary());
    println!("Model: {}", analysis.model_label);

    if let Some(at) = cli.at {
        match analysis.projection {
            Some(projection) => println!(
                "Estimate on {}: {:.2}",
                at.format("%Y-%m-%d"),
                projection.value
            ),
            None => println!("Estimate on {}: no projection", at.format("%Y-%m-%d")),
        }
    }

    Ok(())
}
