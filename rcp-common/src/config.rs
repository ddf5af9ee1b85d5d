//! Configuration loading and resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `RCP_CONFIG` environment variable
//! 3. User config directory (`~/.config/rcp/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: it logs a warning and the compiled
//! defaults apply. A config file that exists but does not parse is an error.

use crate::provider::{CsvDirectoryProvider, TableNames, TableProvider};
use crate::retry::{validate_policy, RetryPolicy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "RCP_CONFIG";

/// Environment variable overriding the input directory
pub const ENV_INPUT_DIR: &str = "RCP_INPUT_DIR";

/// Where the five input tables come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Csv,
    Sqlite,
}

/// Input table location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub source: InputSource,
    /// Directory holding the CSV tables
    pub directory: PathBuf,
    /// SQLite database file (required when `source = "sqlite"`)
    pub sqlite_path: Option<PathBuf>,
    /// Per-table file names (CSV) or table names (SQLite)
    pub files: Option<TableNames>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: InputSource::Csv,
            directory: PathBuf::from("outputs"),
            sqlite_path: None,
            files: None,
        }
    }
}

/// Report / export destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("analysis"),
        }
    }
}

/// Metrics engine policy knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Length of every top-N ranking
    pub top_n: usize,
    pub view_weight: f64,
    pub like_weight: f64,
    pub attempt_weight: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            view_weight: 0.5,
            like_weight: 1.0,
            attempt_weight: 2.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub retry: RetryPolicy,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from this file
    File(PathBuf),
    /// This file was named but does not exist; defaults apply
    Missing(PathBuf),
    /// Nothing named a config file; defaults apply
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Configuration: {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file not found: {} (using built-in defaults)", path.display())
            }
            ConfigSource::Defaults => info!("Configuration: built-in defaults"),
        }
    }
}

/// Locate the config file following the priority order above.
///
/// Returns `None` when nothing points at a config file.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory, only if the file is actually there
    dirs::config_dir()
        .map(|d| d.join("rcp").join("config.toml"))
        .filter(|p| p.exists())
}

impl PipelineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
            .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))
    }

    /// Resolve, load and apply environment overrides.
    ///
    /// Missing config file → defaults. Malformed file → error.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        Self::resolve_with_source(cli_arg).map(|(config, _)| config)
    }

    /// Like [`resolve`](Self::resolve), also reporting where the settings
    /// came from. Logs nothing; call [`ConfigSource::log`] once tracing is up.
    pub fn resolve_with_source(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => (Self::load(&path)?, ConfigSource::File(path)),
            Some(path) => (Self::default(), ConfigSource::Missing(path)),
            None => (Self::default(), ConfigSource::Defaults),
        };

        config.apply_env_overrides();
        Ok((config, source))
    }

    /// Apply `RCP_INPUT_DIR` if set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(ENV_INPUT_DIR) {
            if !dir.trim().is_empty() {
                self.input.directory = PathBuf::from(dir);
            }
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_policy(&self.retry)?;

        if self.analytics.top_n == 0 {
            return Err(Error::Config("analytics.top_n must be at least 1".to_string()));
        }

        let weights = [
            ("view_weight", self.analytics.view_weight),
            ("like_weight", self.analytics.like_weight),
            ("attempt_weight", self.analytics.attempt_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "analytics.{} must be a non-negative number (got {})",
                    name, weight
                )));
            }
        }

        if self.input.source == InputSource::Sqlite && self.input.sqlite_path.is_none() {
            return Err(Error::Config(
                "input.sqlite_path is required when input.source = \"sqlite\"".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the table provider described by `[input]`
    pub fn table_provider(&self) -> Result<Box<dyn TableProvider>> {
        match self.input.source {
            InputSource::Csv => {
                let files = self.input.files.clone().unwrap_or_else(TableNames::csv_defaults);
                Ok(Box::new(CsvDirectoryProvider::with_files(
                    &self.input.directory,
                    files,
                )))
            }
            InputSource::Sqlite => self.sqlite_provider(),
        }
    }

    #[cfg(feature = "sqlx")]
    fn sqlite_provider(&self) -> Result<Box<dyn TableProvider>> {
        let path = self.input.sqlite_path.as_ref().ok_or_else(|| {
            Error::Config("input.sqlite_path is required for the sqlite source".to_string())
        })?;
        let tables = self.input.files.clone().unwrap_or_else(TableNames::logical);
        Ok(Box::new(crate::db::SqliteTableProvider::with_tables(path, tables)))
    }

    #[cfg(not(feature = "sqlx"))]
    fn sqlite_provider(&self) -> Result<Box<dyn TableProvider>> {
        Err(Error::Config(
            "sqlite input requires the `sqlx` feature of rcp-common".to_string(),
        ))
    }
}
