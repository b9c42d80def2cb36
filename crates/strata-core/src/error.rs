//! Error types for definitions, queries, and connections.

use thiserror::Error;

/// Errors raised by the core crate and by [`Connection`](crate::Connection)
/// implementations.
#[derive(Debug, Error)]
pub enum StrataError {
    /// The database server could not be reached.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// A single statement failed to prepare or execute.
    #[error("statement failed: {detail} (sql: {sql})")]
    StatementFailure {
        /// The statement that failed.
        sql: String,
        /// The driver's error text.
        detail: String,
    },

    /// A schema document could not be parsed.
    #[error("invalid schema document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// A schema document could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StrataError {
    /// Creates a statement failure.
    #[must_use]
    pub fn statement(sql: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::StatementFailure {
            sql: sql.into(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, StrataError>;
