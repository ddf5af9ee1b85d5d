//! SQLite-backed table provider
//!
//! Reads the five input tables from a SQLite database opened read-only.
//! Every column is cast to TEXT so the core sees the same optional-text
//! cells it gets from CSV; SQL `NULL` stays null.

use crate::provider::{TableNames, TableProvider};
use crate::table::{Table, TableKind};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Connect to database in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::TableNotFound {
            table: "*".to_string(),
            location: db_path.display().to_string(),
        });
    }

    // mode=ro: the core never writes to its inputs
    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    let pool = SqlitePool::connect(&db_url).await?;

    info!("Connected to database (read-only): {}", db_path.display());
    Ok(pool)
}

/// Quote an identifier for interpolation into SQL
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Reads each table from a SQLite database
pub struct SqliteTableProvider {
    db_path: PathBuf,
    tables: TableNames,
    pool: Option<SqlitePool>,
}

impl SqliteTableProvider {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_tables(db_path, TableNames::logical())
    }

    pub fn with_tables(db_path: impl Into<PathBuf>, tables: TableNames) -> Self {
        Self {
            db_path: db_path.into(),
            tables,
            pool: None,
        }
    }

    fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| Error::Internal("SQLite provider used before open()".to_string()))
    }

    async fn column_names(&self, pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
        let columns = sqlx::query_as::<_, (String,)>(
            "SELECT name FROM pragma_table_info(?) ORDER BY cid",
        )
        .bind(table)
        .fetch_all(pool)
        .await?;

        Ok(columns.into_iter().map(|(name,)| name).collect())
    }
}

#[async_trait]
impl TableProvider for SqliteTableProvider {
    fn describe(&self) -> String {
        format!("SQLite database {}", self.db_path.display())
    }

    async fn open(&mut self) -> Result<()> {
        if self.pool.is_none() {
            self.pool = Some(connect_readonly(&self.db_path).await?);
        }
        Ok(())
    }

    async fn load(&self, kind: TableKind) -> Result<Table> {
        let pool = self.pool()?;
        let sql_table = self.tables.get(kind);

        let exists: Option<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
        )
        .bind(sql_table)
        .fetch_optional(pool)
        .await?;

        if exists.is_none() {
            return Err(Error::TableNotFound {
                table: kind.as_str().to_string(),
                location: format!("{} (table '{}')", self.db_path.display(), sql_table),
            });
        }

        let columns = self.column_names(pool, sql_table).await?;
        let mut table = Table::new(kind.as_str(), columns.clone());
        if columns.is_empty() {
            return Ok(table);
        }

        let select_list = columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT)", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT {} FROM {} ORDER BY rowid", select_list, quote_ident(sql_table));
        debug!(table = kind.as_str(), sql = %query, "Reading SQLite table");

        let rows = sqlx::query(&query).fetch_all(pool).await?;
        for row in rows {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let cell: Option<String> = row.try_get(i)?;
                cells.push(cell.filter(|text| !text.trim().is_empty()));
            }
            table.push_row(cells);
        }

        Ok(table)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            debug!("Closed SQLite pool: {}", self.db_path.display());
        }
        Ok(())
    }
}
