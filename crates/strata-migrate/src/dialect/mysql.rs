//! MySQL dialect for migrations.

use strata_core::Query;
use strata_mysql::quote_identifier;

use super::MigrationDialect;
use crate::operations::{ColumnSchema, MigrationOperation};

/// MySQL migration dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn create_table_sql(&self, name: &str, columns: &[ColumnSchema]) -> String {
        let definitions: Vec<String> = columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect();
        format!("create table {name} ({})", definitions.join(", "))
    }
}

impl MigrationDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn generate_sql(&self, operation: &MigrationOperation) -> String {
        match operation {
            MigrationOperation::CreateDatabase { name } => {
                format!("create database {}", quote_identifier(name))
            }
            MigrationOperation::CreateTable { name, columns } => {
                self.create_table_sql(name, columns)
            }
            MigrationOperation::AddColumn { table, column } => {
                format!("alter table {table} add {}", self.column_definition(column))
            }
            MigrationOperation::ModifyColumn { table, column } => {
                format!(
                    "alter table {table} modify {}",
                    self.column_definition(column)
                )
            }
        }
    }

    fn introspect_query(&self, database: &str, table: &str) -> Query {
        Query::new()
            .table("information_schema.columns")
            .select([
                "cast(column_name as char(255)) as column_name",
                "cast(data_type as char(255)) as data_type",
            ])
            .and_where("table_schema", "=", database)
            .and_where("table_name", "=", table)
            .order_by("ordinal_position", "asc")
    }

    fn implicit_columns(&self) -> Vec<ColumnSchema> {
        vec![
            ColumnSchema::new("id", "int").primary_key().auto_increment(),
            ColumnSchema::new("created_at", "datetime"),
            ColumnSchema::new("updated_at", "datetime"),
        ]
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "auto_increment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::SqlValue;

    fn dialect() -> MySqlDialect {
        MySqlDialect::new()
    }

    #[test]
    fn test_create_database() {
        let sql = dialect().generate_sql(&MigrationOperation::create_database("shop"));
        assert_eq!(sql, "create database `shop`");
    }

    #[test]
    fn test_create_database_escapes_backticks() {
        let sql = dialect().generate_sql(&MigrationOperation::create_database("a`b"));
        assert_eq!(sql, "create database `a``b`");
    }

    #[test]
    fn test_name() {
        assert_eq!(dialect().name(), "mysql");
    }

    #[test]
    fn test_create_table_with_implicit_columns() {
        let mut columns = dialect().implicit_columns();
        columns.push(ColumnSchema::new("title", "varchar(191)"));

        let sql = dialect().generate_sql(&MigrationOperation::create_table("posts", columns));
        assert_eq!(
            sql,
            "create table posts (id int primary key auto_increment, \
             created_at datetime, updated_at datetime, title varchar(191))"
        );
    }

    #[test]
    fn test_add_column() {
        let op = MigrationOperation::add_column("posts", ColumnSchema::new("body", "longtext"));
        assert_eq!(dialect().generate_sql(&op), "alter table posts add body longtext");
    }

    #[test]
    fn test_modify_column() {
        let op = MigrationOperation::modify_column("items", ColumnSchema::new("price", "decimal"));
        assert_eq!(
            dialect().generate_sql(&op),
            "alter table items modify price decimal"
        );
    }

    #[test]
    fn test_introspect_query_binds_schema_and_table() {
        let query = dialect().introspect_query("shop", "items");
        assert_eq!(
            query.statement(),
            "select cast(column_name as char(255)) as column_name, \
             cast(data_type as char(255)) as data_type \
             from information_schema.columns \
             where table_schema = ? and table_name = ? \
             order by ordinal_position asc"
        );
        assert_eq!(
            query.bindings(),
            &[
                SqlValue::Text("shop".to_string()),
                SqlValue::Text("items".to_string())
            ]
        );
    }
}
