//! Migration operations.
//!
//! Every operation is additive: the reconciler can create databases and
//! tables, add columns and change a column's type, but never drops.

use std::fmt;

use serde::Serialize;

/// A column as it appears in generated DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Physical SQL type, e.g. `varchar(191)`.
    pub sql_type: String,
    /// Whether this is the primary key.
    pub primary_key: bool,
    /// Whether the value is generated by the database.
    pub auto_increment: bool,
}

impl ColumnSchema {
    /// Creates a plain column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Marks this column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks this column as auto-incrementing.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// A single schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationOperation {
    /// Create the target database.
    CreateDatabase {
        /// Database name.
        name: String,
    },

    /// Create a new table.
    CreateTable {
        /// Table name.
        name: String,
        /// Column definitions, implicit columns first.
        columns: Vec<ColumnSchema>,
    },

    /// Add a column to a table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: ColumnSchema,
    },

    /// Change the type of an existing column.
    ModifyColumn {
        /// Table name.
        table: String,
        /// New column definition.
        column: ColumnSchema,
    },
}

impl MigrationOperation {
    /// Creates a `CreateDatabase` operation.
    #[must_use]
    pub fn create_database(name: impl Into<String>) -> Self {
        Self::CreateDatabase { name: name.into() }
    }

    /// Creates a `CreateTable` operation.
    #[must_use]
    pub fn create_table(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self::CreateTable {
            name: name.into(),
            columns,
        }
    }

    /// Creates an `AddColumn` operation.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: ColumnSchema) -> Self {
        Self::AddColumn {
            table: table.into(),
            column,
        }
    }

    /// Creates a `ModifyColumn` operation.
    #[must_use]
    pub fn modify_column(table: impl Into<String>, column: ColumnSchema) -> Self {
        Self::ModifyColumn {
            table: table.into(),
            column,
        }
    }

    /// The table this operation touches, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::CreateDatabase { .. } => None,
            Self::CreateTable { name, .. } => Some(name),
            Self::AddColumn { table, .. } | Self::ModifyColumn { table, .. } => Some(table),
        }
    }
}

impl fmt::Display for MigrationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDatabase { name } => write!(f, "create database {name}"),
            Self::CreateTable { name, columns } => {
                write!(f, "create table {name} ({} columns)", columns.len())
            }
            Self::AddColumn { table, column } => {
                write!(f, "add {table}.{} {}", column.name, column.sql_type)
            }
            Self::ModifyColumn { table, column } => {
                write!(f, "modify {table}.{} {}", column.name, column.sql_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builder() {
        let column = ColumnSchema::new("id", "int").primary_key().auto_increment();
        assert!(column.primary_key);
        assert!(column.auto_increment);
        assert_eq!(column.sql_type, "int");
    }

    #[test]
    fn test_operation_table() {
        assert_eq!(MigrationOperation::create_database("shop").table(), None);
        assert_eq!(
            MigrationOperation::add_column("items", ColumnSchema::new("sku", "varchar(191)"))
                .table(),
            Some("items")
        );
    }

    #[test]
    fn test_display() {
        let op = MigrationOperation::modify_column("items", ColumnSchema::new("price", "decimal"));
        assert_eq!(op.to_string(), "modify items.price decimal");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let op = MigrationOperation::add_column("items", ColumnSchema::new("sku", "varchar(191)"));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "add_column");
        assert_eq!(json["column"]["name"], "sku");
    }
}
