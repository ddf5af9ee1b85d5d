//! # Recipe Pipeline Common Library
//!
//! Shared code for the pipeline stages including:
//! - Error type and result alias
//! - Configuration loading (TOML + environment + CLI priority)
//! - Retry policy for input reads
//! - In-memory tables and typed entity records
//! - Table providers (CSV directory, SQLite)

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod provider;
pub mod retry;
pub mod table;

pub use error::{Error, Result};
pub use provider::{load_dataset, Dataset, TableProvider};
pub use retry::RetryPolicy;
pub use table::{Table, TableKind};
