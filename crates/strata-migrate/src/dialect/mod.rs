//! Database dialect implementations.
//!
//! A dialect knows how to render migration operations as SQL, how to ask
//! the server which columns a table has, and when two type names describe
//! the same column type.

mod mysql;

pub use mysql::MySqlDialect;

use strata_core::{Query, Record, SqlValue};

use crate::operations::{ColumnSchema, MigrationOperation};

/// A column reported by the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
    /// Column name as stored.
    pub name: String,
    /// Reported data type.
    pub data_type: String,
}

impl LiveColumn {
    /// Creates a live column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Reads a `{column_name, data_type}` row. Rows without a column name
    /// are ignored.
    #[must_use]
    pub fn from_record(row: &Record) -> Option<Self> {
        let name = row.get("column_name")?.as_text()?;
        let data_type = row
            .get("data_type")
            .and_then(SqlValue::as_text)
            .unwrap_or_default();
        Some(Self::new(name, data_type))
    }
}

/// Trait for database-specific SQL generation and introspection.
pub trait MigrationDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Generates the SQL statement for a migration operation.
    fn generate_sql(&self, operation: &MigrationOperation) -> String;

    /// Builds the query listing `{column_name, data_type}` of one table.
    fn introspect_query(&self, database: &str, table: &str) -> Query;

    /// Columns every created table receives ahead of its declared ones.
    fn implicit_columns(&self) -> Vec<ColumnSchema>;

    /// Returns the auto-increment keyword for this dialect.
    fn auto_increment_keyword(&self) -> &'static str;

    /// Reduces a type name to its family: lowercase, without length or
    /// precision.
    fn type_family(&self, sql_type: &str) -> String {
        sql_type
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    /// Whether a declared and a live type name belong to the same family.
    fn same_type(&self, declared: &str, live: &str) -> bool {
        self.type_family(declared) == self.type_family(live)
    }

    /// Generates column definition SQL.
    fn column_definition(&self, column: &ColumnSchema) -> String {
        let mut parts = vec![column.name.clone(), column.sql_type.clone()];

        if column.primary_key {
            parts.push("primary key".to_string());
        }
        if column.auto_increment {
            parts.push(self.auto_increment_keyword().to_string());
        }

        parts.join(" ")
    }
}
