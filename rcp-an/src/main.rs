//! rcp-an - metrics and corpus analytics stage
//!
//! Loads the five input tables, computes per-recipe metrics and corpus
//! statistics, and writes the CSV/JSON/text exports to the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use rcp_an::{export, MetricsEngine};
use rcp_common::config::{InputSource, PipelineConfig};
use rcp_common::load_dataset;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "rcp-an")]
#[command(about = "Compute recipe metrics and corpus analytics")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the input CSV tables
    #[arg(short, long, conflicts_with = "sqlite")]
    input: Option<PathBuf>,

    /// Read the input tables from a SQLite database instead
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// Directory the exports are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Length of every top-N ranking
    #[arg(long)]
    top_n: Option<usize>,
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_source) = PipelineConfig::resolve_with_source(args.config.as_deref())?;
    init_tracing(&config.logging.level);

    info!(
        "Starting recipe analytics (rcp-an) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config_source.log();

    if let Some(dir) = args.input {
        config.input.source = InputSource::Csv;
        config.input.directory = dir;
    }
    if let Some(db) = args.sqlite {
        config.input.source = InputSource::Sqlite;
        config.input.sqlite_path = Some(db);
    }
    if let Some(dir) = args.output {
        config.output.directory = dir;
    }
    if let Some(top_n) = args.top_n {
        config.analytics.top_n = top_n;
    }
    config.validate()?;

    let mut provider = config.table_provider()?;
    let dataset = match load_dataset(provider.as_mut(), &config.retry).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to load input tables: {}", e);
            return Err(e.into());
        }
    };

    let engine = MetricsEngine::from_config(&config.analytics);
    info!(
        "Engagement weights: view={} like={} attempt={}, top_n={}",
        engine.weights().view,
        engine.weights().like,
        engine.weights().attempt,
        engine.top_n()
    );
    let report = engine.run(&dataset);

    let out_dir = config.output.directory.clone();
    let written = tokio::task::spawn_blocking(move || export::write_all(&out_dir, &report))
        .await
        .context("Export task failed")?
        .with_context(|| format!("Failed to write exports to {}", config.output.directory.display()))?;

    for path in &written {
        info!("✓ Wrote {}", path.display());
    }
    info!("Analytics complete: {} files", written.len());

    Ok(())
}
