//! Common error types for the recipe pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across pipeline stages
///
/// Only failures to *obtain* input surface here. Data-quality problems are
/// reported as findings by the validator and never become an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input table could not be located
    #[error("Table '{table}' not found at {location}")]
    TableNotFound { table: String, location: String },

    /// Input table exists but could not be parsed
    #[error("Failed to read table '{table}' from {location}: {source}")]
    TableRead {
        table: String,
        location: String,
        #[source]
        source: csv::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report or export encoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid caller input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether a retry policy may reasonably attempt the operation again.
    ///
    /// Missing tables and malformed content are structural, so retrying them
    /// only delays the inevitable failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            #[cfg(feature = "sqlx")]
            Error::Database(err) => !matches!(
                err,
                sqlx::Error::RowNotFound | sqlx::Error::ColumnNotFound(_)
            ),
            Error::Io(err) => !matches!(
                err.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ),
            Error::TableRead { source, .. } => match source.kind() {
                csv::ErrorKind::Io(io) => !matches!(
                    io.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
                ),
                _ => false,
            },
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
