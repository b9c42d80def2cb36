//! Migration executor.
//!
//! Runs the reconciliation of a [`Schema`] against a live database: first
//! the database itself, then every declared table in document order. One
//! failing statement never stops the ones after it.
//!
//! Runs are not coordinated: two migrators working on the same database
//! at the same time can plan against stale columns.

use strata_core::{Connection, Schema, StrataError, Table};
use tracing::{debug, info, warn};

use crate::dialect::{LiveColumn, MigrationDialect};
use crate::error::{MigrateError, Result};
use crate::operations::MigrationOperation;
use crate::planner::plan_table;
use crate::report::{DatabaseOutcome, MigrationReport, MigrationStep, Outcome};

/// Reconciles live databases with declared schemas.
pub struct Migrator<C: Connection, D: MigrationDialect> {
    conn: C,
    dialect: D,
    dry_run: bool,
}

impl<C: Connection, D: MigrationDialect> Migrator<C, D> {
    /// Creates a new migrator.
    #[must_use]
    pub const fn new(conn: C, dialect: D) -> Self {
        Self {
            conn,
            dialect,
            dry_run: false,
        }
    }

    /// Enables dry-run mode: tables are introspected but no DDL executes.
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the connection.
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Runs one reconciliation of `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ConnectionFailure`] when the database check
    /// or creation fails; no table work is attempted in that case. Every
    /// later failure is recorded in the report instead.
    pub async fn run(&self, schema: &Schema) -> Result<MigrationReport> {
        let database = self.conn.database().to_string();
        info!(
            database = %database,
            dialect = self.dialect.name(),
            tables = schema.tables().len(),
            dry_run = self.dry_run,
            "Starting migration"
        );

        let (database_outcome, database_sql) = self.ensure_database().await?;
        let mut report = MigrationReport::new(&database, database_outcome);
        report.database_sql = database_sql;

        for table in schema.tables() {
            if database_outcome == DatabaseOutcome::Skipped {
                // Nothing exists yet; plan every table from scratch.
                self.apply(table, &[], &mut report).await;
            } else {
                self.reconcile(table, &mut report).await;
            }
        }

        let failed = report.failures().count();
        if failed > 0 {
            warn!(database = %database, failed, "Migration finished with failures");
        } else {
            info!(database = %database, steps = report.steps.len(), "Migration finished");
        }
        Ok(report)
    }

    /// Makes sure the target database exists, returning the creation
    /// statement when one was issued or planned.
    async fn ensure_database(&self) -> Result<(DatabaseOutcome, Option<String>)> {
        let database = self.conn.database();
        let connection_failure = |err: StrataError| MigrateError::ConnectionFailure {
            database: database.to_string(),
            message: err.to_string(),
        };

        if self
            .conn
            .database_exists()
            .await
            .map_err(connection_failure)?
        {
            debug!(database = %database, "Database exists");
            return Ok((DatabaseOutcome::Existing, None));
        }

        let sql = self
            .dialect
            .generate_sql(&MigrationOperation::create_database(database));
        if self.dry_run {
            info!(database = %database, "Database missing, creation skipped (dry run)");
            return Ok((DatabaseOutcome::Skipped, Some(sql)));
        }

        self.conn
            .admin_statement(&sql)
            .await
            .map_err(connection_failure)?;

        info!(database = %database, "Created database");
        Ok((DatabaseOutcome::Created, Some(sql)))
    }

    /// Lists the live columns of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Database`] when the introspection query
    /// fails.
    pub async fn introspect(&self, table: &Table) -> Result<Vec<LiveColumn>> {
        let query = self
            .dialect
            .introspect_query(self.conn.database(), table.physical_name());
        let rows = self.conn.execute(&query).await?;
        Ok(rows.iter().filter_map(LiveColumn::from_record).collect())
    }

    async fn reconcile(&self, table: &Table, report: &mut MigrationReport) {
        match self.introspect(table).await {
            Ok(live) => {
                debug!(table = %table.key(), live_columns = live.len(), "Introspected table");
                self.apply(table, &live, report).await;
            }
            Err(err) => {
                let sql = self
                    .dialect
                    .introspect_query(self.conn.database(), table.physical_name())
                    .statement();
                warn!(table = %table.key(), error = %err, "Introspection failed, skipping table");
                report.steps.push(MigrationStep {
                    table: table.key().to_string(),
                    operation: None,
                    sql,
                    outcome: Outcome::Failed(match &err {
                        MigrateError::Database(inner) => failure_detail(inner),
                        other => other.to_string(),
                    }),
                });
            }
        }
    }

    async fn apply(&self, table: &Table, live: &[LiveColumn], report: &mut MigrationReport) {
        let operations = plan_table(&self.dialect, table, live);
        if operations.is_empty() {
            debug!(table = %table.key(), "Table up to date");
        }

        for operation in operations {
            let sql = self.dialect.generate_sql(&operation);
            debug!(sql = %sql, "Executing SQL");

            let outcome = if self.dry_run {
                Outcome::Planned
            } else {
                match self.conn.statement(&sql, &[]).await {
                    Ok(_) => {
                        info!(table = %table.key(), operation = %operation, "Applied");
                        Outcome::Applied
                    }
                    Err(err) => {
                        warn!(table = %table.key(), sql = %sql, error = %err, "Migration step failed");
                        Outcome::Failed(failure_detail(&err))
                    }
                }
            };

            report.steps.push(MigrationStep {
                table: table.key().to_string(),
                operation: Some(operation),
                sql,
                outcome,
            });
        }
    }
}

/// The driver's error text; the SQL is already part of the step.
fn failure_detail(err: &StrataError) -> String {
    match err {
        StrataError::StatementFailure { detail, .. } => detail.clone(),
        other => other.to_string(),
    }
}
