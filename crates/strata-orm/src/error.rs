//! Error types for the model layer.

use strata_core::StrataError;
use thiserror::Error;

/// Model-layer errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// A statement failed.
    #[error("database error: {0}")]
    Database(#[from] StrataError),

    /// No table is declared under this key.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The column is neither declared nor implicit.
    #[error("unknown column '{column}' on table '{table}'")]
    UnknownColumn {
        /// Schema key of the table.
        table: String,
        /// Offending column.
        column: String,
    },

    /// An insert succeeded but the new row could not be read back, so the
    /// model has no `id`. Saving it again would insert a second row.
    #[error("row inserted into '{0}' but not read back")]
    NotReadBack(String),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, OrmError>;
