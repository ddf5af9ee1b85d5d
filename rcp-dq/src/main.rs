//! rcp-dq - data-quality validation stage
//!
//! Loads the five input tables (CSV directory or SQLite), runs the
//! validator and writes `validation_report.json` and/or
//! `validation_report.txt` to the output directory.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rcp_common::config::{InputSource, PipelineConfig};
use rcp_common::load_dataset;
use rcp_dq::Validator;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "rcp-dq")]
#[command(about = "Validate recipe pipeline tables and write a data-quality report")]
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

    /// Directory the reports are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format(s) to write
    #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
    format: ReportFormat,

    /// Exit non-zero when any expectation, record or step sequence fails
    #[arg(long)]
    fail_on_error: bool,
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing so the configured level applies
    let (mut config, config_source) = PipelineConfig::resolve_with_source(args.config.as_deref())?;
    init_tracing(&config.logging.level);

    info!(
        "Starting recipe data-quality validation (rcp-dq) v{} [{}] built {} ({})",
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
    config.validate()?;

    let mut provider = config.table_provider()?;
    let dataset = match load_dataset(provider.as_mut(), &config.retry).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to load input tables: {}", e);
            return Err(e.into());
        }
    };

    let report = Validator::new().validate(&dataset);

    let out_dir = &config.output.directory;
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    if matches!(args.format, ReportFormat::Json | ReportFormat::Both) {
        let path = out_dir.join("validation_report.json");
        tokio::fs::write(&path, report.to_json()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("✓ Wrote {}", path.display());
    }
    if matches!(args.format, ReportFormat::Text | ReportFormat::Both) {
        let path = out_dir.join("validation_report.txt");
        tokio::fs::write(&path, report.render_text())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("✓ Wrote {}", path.display());
    }

    if report.all_passed() {
        info!("All {} expectations passed", report.findings.len());
    } else {
        warn!(
            "{} of {} expectations failed",
            report.summary.findings_failed,
            report.findings.len()
        );
    }

    if args.fail_on_error && !report.is_clean() {
        bail!(
            "validation failed: {} expectation(s), {} record(s), {} step sequence(s)",
            report.summary.findings_failed,
            report.records.invalid_count(),
            report.step_sequences.len()
        );
    }

    Ok(())
}
