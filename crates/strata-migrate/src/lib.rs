//! Declarative, additive schema reconciliation.
//!
//! `strata-migrate` brings a live database in line with a declared
//! [`Schema`](strata_core::Schema):
//! - a missing database is created
//! - a table with no columns is created with `id`, `created_at`,
//!   `updated_at` and every declared column
//! - missing columns are added, columns of another type family are
//!   modified, and nothing is ever dropped
//!
//! # Architecture
//!
//! - **Operations** - the additive schema changes
//! - **Dialect** - database-specific SQL generation and introspection
//! - **Planner** - diffs one declared table against its live columns
//! - **Migrator** - runs the plan, isolating failures per statement
//! - **Report** - what happened, step by step
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Schema, ScriptedConnection};
//! use strata_migrate::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::from_json_str(
//!     r#"{"tables": {"items": {"columns": {"name": {"type": "string"}}}}}"#,
//! ).unwrap();
//!
//! let migrator = Migrator::new(ScriptedConnection::new("shop"), MySqlDialect::new());
//! let report = migrator.run(&schema).await.unwrap();
//!
//! assert!(!report.has_failures());
//! assert_eq!(
//!     sql_for(&report),
//!     vec!["create table items (id int primary key auto_increment, \
//!           created_at datetime, updated_at datetime, name varchar(191))"]
//! );
//! # });
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Reconcile the database declared in schema.json
//! strata-migrate --schema schema.json migrate
//!
//! # Show what would change without touching anything
//! strata-migrate migrate --dry-run
//!
//! # List declared tables
//! strata-migrate tables
//!
//! # Print the CREATE TABLE statement for one table
//! strata-migrate sql items
//! ```

pub mod dialect;
pub mod error;
pub mod migrator;
pub mod operations;
pub mod planner;
pub mod report;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{LiveColumn, MigrationDialect, MySqlDialect};
    pub use crate::error::{MigrateError, Result};
    pub use crate::migrator::Migrator;
    pub use crate::operations::{ColumnSchema, MigrationOperation};
    pub use crate::planner::plan_table;
    pub use crate::report::{sql_for, DatabaseOutcome, MigrationReport, MigrationStep, Outcome};
}
