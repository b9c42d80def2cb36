//! Error types for the migration system.

use strata_core::StrataError;

/// Errors that abort a migration run.
///
/// Failures of individual DDL statements do not abort a run; they are
/// collected in the [`MigrationReport`](crate::report::MigrationReport).
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The server could not be reached, or the target database could not
    /// be created.
    #[error("Connection failure for database '{database}': {message}")]
    ConnectionFailure {
        /// Target database.
        database: String,
        /// Driver error text.
        message: String,
    },

    /// Database error outside the reconciliation steps.
    #[error("Database error: {0}")]
    Database(#[from] StrataError),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
