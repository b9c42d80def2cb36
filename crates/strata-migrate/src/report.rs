//! The outcome of one migration run.

use std::fmt;

use serde::Serialize;

use crate::operations::MigrationOperation;

/// What happened to the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseOutcome {
    /// The database was already there.
    Existing,
    /// The database was missing and has been created.
    Created,
    /// The database was missing and creation was skipped (dry run).
    Skipped,
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// The statement executed.
    Applied,
    /// The statement was planned but not executed (dry run).
    Planned,
    /// The statement failed with the driver's error text.
    Failed(String),
}

impl Outcome {
    /// Returns true for [`Outcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Planned => write!(f, "planned"),
            Self::Failed(detail) => write!(f, "failed: {detail}"),
        }
    }
}

/// One statement the run attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStep {
    /// Schema key of the table the step belongs to.
    pub table: String,
    /// The schema change, or `None` for the introspection query.
    pub operation: Option<MigrationOperation>,
    /// The SQL text.
    pub sql: String,
    /// Result of the step.
    pub outcome: Outcome,
}

impl MigrationStep {
    /// Whether this step introspected the live table rather than changing it.
    #[must_use]
    pub const fn is_introspection(&self) -> bool {
        self.operation.is_none()
    }
}

/// Summary of a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Name of the target database.
    pub database: String,
    /// What happened to the database itself.
    pub database_outcome: DatabaseOutcome,
    /// The statement that created the database, or would have in a dry run.
    pub database_sql: Option<String>,
    /// Every attempted step, in execution order.
    pub steps: Vec<MigrationStep>,
}

impl MigrationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(database: impl Into<String>, database_outcome: DatabaseOutcome) -> Self {
        Self {
            database: database.into(),
            database_outcome,
            database_sql: None,
            steps: Vec::new(),
        }
    }

    /// Records the database creation statement.
    #[must_use]
    pub fn with_database_sql(mut self, sql: impl Into<String>) -> Self {
        self.database_sql = Some(sql.into());
        self
    }

    /// Steps that failed.
    pub fn failures(&self) -> impl Iterator<Item = &MigrationStep> {
        self.steps.iter().filter(|step| step.outcome.is_failed())
    }

    /// Whether any step failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Number of steps with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: &Outcome) -> usize {
        self.steps
            .iter()
            .filter(|step| match (&step.outcome, outcome) {
                (Outcome::Failed(_), Outcome::Failed(_)) => true,
                (left, right) => left == right,
            })
            .count()
    }
}

/// Renders the DDL of a run, one statement per entry.
///
/// Includes the `create database` statement when the database was created
/// or would have been, and every schema-changing step whatever its outcome.
/// Introspection queries are left out.
#[must_use]
pub fn sql_for(report: &MigrationReport) -> Vec<String> {
    report
        .database_sql
        .iter()
        .cloned()
        .chain(
            report
                .steps
                .iter()
                .filter(|step| !step.is_introspection())
                .map(|step| step.sql.clone()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::ColumnSchema;

    fn step(sql: &str, outcome: Outcome) -> MigrationStep {
        MigrationStep {
            table: "items".to_string(),
            operation: Some(MigrationOperation::add_column(
                "items",
                ColumnSchema::new("sku", "varchar(191)"),
            )),
            sql: sql.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_failures() {
        let mut report = MigrationReport::new("shop", DatabaseOutcome::Existing);
        report.steps.push(step("alter table items add a int", Outcome::Applied));
        report
            .steps
            .push(step("alter table items add b int", Outcome::Failed("boom".into())));

        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.count(&Outcome::Applied), 1);
        assert_eq!(report.count(&Outcome::Failed(String::new())), 1);
    }

    #[test]
    fn test_sql_for_includes_database_creation() {
        let mut report = MigrationReport::new("shop", DatabaseOutcome::Skipped)
            .with_database_sql("create database `shop`");
        report.steps.push(MigrationStep {
            table: "items".to_string(),
            operation: None,
            sql: "select ...".to_string(),
            outcome: Outcome::Applied,
        });
        report.steps.push(step("create table items (id int)", Outcome::Planned));

        assert_eq!(
            sql_for(&report),
            vec!["create database `shop`", "create table items (id int)"]
        );
    }

    #[test]
    fn test_sql_for_existing_database() {
        let report = MigrationReport::new("shop", DatabaseOutcome::Existing);
        assert!(sql_for(&report).is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(Outcome::Failed("denied".into())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "failed", "detail": "denied"}));
        let json = serde_json::to_value(Outcome::Applied).unwrap();
        assert_eq!(json, serde_json::json!({"status": "applied"}));
    }
}
