//! In-memory tabular data
//!
//! A [`Table`] is a fully materialized, header-ordered grid of optional text
//! cells. Every column access is fallible: a missing column and a null cell
//! both read as `None`, so callers decide what absence means instead of the
//! loader silently substituting a default.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// The five input tables consumed by the pipeline core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Recipes,
    Ingredients,
    Steps,
    Users,
    Interactions,
}

impl TableKind {
    /// All tables in load and report order
    pub const ALL: [TableKind; 5] = [
        TableKind::Recipes,
        TableKind::Ingredients,
        TableKind::Steps,
        TableKind::Users,
        TableKind::Interactions,
    ];

    /// Logical table name used in reports and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Recipes => "recipes",
            TableKind::Ingredients => "ingredients",
            TableKind::Steps => "steps",
            TableKind::Users => "users",
            TableKind::Interactions => "interactions",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named grid of optional text cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Borrowed view of a single table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Zero-based position of the row in its table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell text, or `None` if the column is absent or the cell is null
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.cell(self.index, column)
    }

    /// First non-absent column among `aliases`, read as a cell
    pub fn get_any(&self, aliases: &[&str]) -> Option<&'a str> {
        self.table
            .resolve_column(aliases)
            .and_then(|column| self.get(column))
    }
}

/// Provenance summary of a loaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFingerprint {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub sha256: String,
}

/// A cell is null when it holds nothing but whitespace
fn normalize_cell(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from literal text rows; empty strings become nulls.
    ///
    /// Handy for fixtures:
    /// ```
    /// use rcp_common::Table;
    /// let t = Table::from_text_rows("users", &["id", "name"], &[&["u1", "Ann"], &["u2", ""]]);
    /// assert_eq!(t.cell(1, "name"), None);
    /// ```
    pub fn from_text_rows(name: &str, columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|cell| normalize_cell(cell)).collect());
        }
        table
    }

    /// Append a row, padding short rows with nulls and dropping surplus cells
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// First alias that names a present column
    pub fn resolve_column<'n>(&self, aliases: &[&'n str]) -> Option<&'n str> {
        aliases.iter().copied().find(|alias| self.has_column(alias))
    }

    /// Cell text at `(row, column)`; `None` if either is absent or the cell is null
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Every cell of a column in row order, or `None` if the column is absent
    pub fn column_values(&self, column: &str) -> Option<Vec<Option<&str>>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row[col].as_deref()).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    /// Row count, header and a SHA-256 digest over header and cells
    pub fn fingerprint(&self) -> TableFingerprint {
        let mut hasher = Sha256::new();
        for column in &self.columns {
            hasher.update(column.as_bytes());
            hasher.update([0x1f]);
        }
        for row in &self.rows {
            hasher.update([0x1e]);
            for cell in row {
                match cell {
                    Some(text) => hasher.update(text.as_bytes()),
                    None => hasher.update([0x00]),
                }
                hasher.update([0x1f]);
            }
        }

        TableFingerprint {
            table: self.name.clone(),
            rows: self.rows.len(),
            columns: self.columns.clone(),
            sha256: format!("{:x}", hasher.finalize()),
        }
    }

    /// Parse CSV with a header row from any reader
    pub fn from_csv_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
    ) -> std::result::Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut table = Self::new(name, columns);

        for record in csv_reader.records() {
            let record = record?;
            table.push_row(record.iter().map(normalize_cell).collect());
        }

        Ok(table)
    }

    /// Load a CSV file, attributing any failure to the table and path
    pub fn read_csv(name: &str, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::TableNotFound {
                table: name.to_string(),
                location: path.display().to_string(),
            });
        }

        let file = std::fs::File::open(path).map_err(|e| Error::TableRead {
            table: name.to_string(),
            location: path.display().to_string(),
            source: csv::Error::from(e),
        })?;

        let table = Self::from_csv_reader(name, file).map_err(|source| Error::TableRead {
            table: name.to_string(),
            location: path.display().to_string(),
            source,
        })?;

        debug!(
            table = name,
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            "Loaded CSV table"
        );

        Ok(table)
    }
}
