//! Table providers
//!
//! The pipeline core never reaches into ambient store state: a caller
//! injects a [`TableProvider`], which is opened at run start, asked for each
//! of the five tables, and closed at run end. [`load_dataset`] drives that
//! lifecycle and applies the caller's [`RetryPolicy`] to every read.

use crate::retry::RetryPolicy;
use crate::table::{Table, TableFingerprint, TableKind};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Source of the five input tables
#[async_trait]
pub trait TableProvider: Send + Sync {
    /// Human-readable description of where tables come from
    fn describe(&self) -> String;

    /// Acquire whatever the provider needs (directory check, connection)
    async fn open(&mut self) -> Result<()>;

    /// Load one table fully into memory
    async fn load(&self, kind: TableKind) -> Result<Table>;

    /// Release resources acquired in `open`
    async fn close(&mut self) -> Result<()>;
}

/// Per-table names (file names for CSV, table names for SQLite)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub recipes: String,
    pub ingredients: String,
    pub steps: String,
    pub users: String,
    pub interactions: String,
}

impl TableNames {
    /// File names written by the CSV flattening stage
    pub fn csv_defaults() -> Self {
        Self {
            recipes: "recipe.csv".to_string(),
            ingredients: "ingredients.csv".to_string(),
            steps: "steps.csv".to_string(),
            users: "users.csv".to_string(),
            interactions: "interactions.csv".to_string(),
        }
    }

    /// Logical names, used as SQL table names
    pub fn logical() -> Self {
        Self {
            recipes: TableKind::Recipes.as_str().to_string(),
            ingredients: TableKind::Ingredients.as_str().to_string(),
            steps: TableKind::Steps.as_str().to_string(),
            users: TableKind::Users.as_str().to_string(),
            interactions: TableKind::Interactions.as_str().to_string(),
        }
    }

    pub fn get(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Recipes => &self.recipes,
            TableKind::Ingredients => &self.ingredients,
            TableKind::Steps => &self.steps,
            TableKind::Users => &self.users,
            TableKind::Interactions => &self.interactions,
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::csv_defaults()
    }
}

/// Reads each table from a CSV file in one directory
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    directory: PathBuf,
    files: TableNames,
}

impl CsvDirectoryProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_files(directory, TableNames::csv_defaults())
    }

    pub fn with_files(directory: impl Into<PathBuf>, files: TableNames) -> Self {
        Self {
            directory: directory.into(),
            files,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        self.directory.join(self.files.get(kind))
    }
}

#[async_trait]
impl TableProvider for CsvDirectoryProvider {
    fn describe(&self) -> String {
        format!("CSV directory {}", self.directory.display())
    }

    async fn open(&mut self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(Error::TableNotFound {
                table: "*".to_string(),
                location: self.directory.display().to_string(),
            });
        }
        Ok(())
    }

    async fn load(&self, kind: TableKind) -> Result<Table> {
        let path = self.path_for(kind);
        let name = kind.as_str();
        // CSV parsing is blocking file I/O; keep it off the async workers
        tokio::task::spawn_blocking(move || Table::read_csv(name, &path))
            .await
            .map_err(|e| Error::Internal(format!("CSV reader task failed: {}", e)))?
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The five input tables, fully resident in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub recipes: Table,
    pub ingredients: Table,
    pub steps: Table,
    pub users: Table,
    pub interactions: Table,
}

impl Dataset {
    pub fn table(&self, kind: TableKind) -> &Table {
        match kind {
            TableKind::Recipes => &self.recipes,
            TableKind::Ingredients => &self.ingredients,
            TableKind::Steps => &self.steps,
            TableKind::Users => &self.users,
            TableKind::Interactions => &self.interactions,
        }
    }

    /// Fingerprints of all five tables in load order
    pub fn fingerprints(&self) -> Vec<TableFingerprint> {
        TableKind::ALL
            .iter()
            .map(|kind| self.table(*kind).fingerprint())
            .collect()
    }
}

/// Open the provider, load all five tables (each read under `retry`), close.
///
/// `close` runs even when a load fails; the load error takes precedence.
pub async fn load_dataset<P>(provider: &mut P, retry: &RetryPolicy) -> Result<Dataset>
where
    P: TableProvider + ?Sized,
{
    info!("Opening table provider: {}", provider.describe());
    provider.open().await?;

    let loaded = load_all(&*provider, retry).await;

    if let Err(e) = provider.close().await {
        warn!("Failed to close table provider cleanly: {}", e);
    }

    let mut tables = loaded?;
    let mut take = |kind: TableKind| {
        tables
            .remove(&kind)
            .ok_or_else(|| Error::Internal(format!("table '{}' was not loaded", kind)))
    };

    Ok(Dataset {
        recipes: take(TableKind::Recipes)?,
        ingredients: take(TableKind::Ingredients)?,
        steps: take(TableKind::Steps)?,
        users: take(TableKind::Users)?,
        interactions: take(TableKind::Interactions)?,
    })
}

async fn load_all<P>(provider: &P, retry: &RetryPolicy) -> Result<BTreeMap<TableKind, Table>>
where
    P: TableProvider + ?Sized,
{
    let mut tables = BTreeMap::new();
    for kind in TableKind::ALL {
        let op_name = format!("load {}", kind);
        let table = retry.run(&op_name, move || provider.load(kind)).await?;
        info!(
            table = kind.as_str(),
            rows = table.len(),
            columns = table.columns().len(),
            "Loaded table"
        );
        tables.insert(kind, table);
    }
    Ok(tables)
}
