//! Reconciliation planning.
//!
//! Compares one declared table with the columns the live database
//! reports and lists the additive operations that close the gap.

use strata_core::Table;

use crate::dialect::{LiveColumn, MigrationDialect};
use crate::operations::{ColumnSchema, MigrationOperation};

/// Plans the operations that bring a live table in line with `table`.
///
/// - No live columns: one `CreateTable` holding the dialect's implicit
///   columns followed by every declared column.
/// - Otherwise, per declared column in declaration order: `AddColumn`
///   when missing, `ModifyColumn` when its type family differs.
///
/// Column names compare ASCII case-insensitively. Live columns that are
/// not declared are left alone, and declared columns named like an
/// implicit column are never emitted.
#[must_use]
pub fn plan_table<D>(dialect: &D, table: &Table, live: &[LiveColumn]) -> Vec<MigrationOperation>
where
    D: MigrationDialect + ?Sized,
{
    let implicit = dialect.implicit_columns();
    let physical = table.physical_name();

    let declared: Vec<ColumnSchema> = table
        .columns()
        .filter(|(key, _)| {
            !implicit
                .iter()
                .any(|column| column.name.eq_ignore_ascii_case(key))
        })
        .map(|(key, column)| ColumnSchema::new(key, column.sql_type()))
        .collect();

    if live.is_empty() {
        let mut columns = implicit;
        columns.extend(declared);
        return vec![MigrationOperation::create_table(physical, columns)];
    }

    declared
        .into_iter()
        .filter_map(|column| {
            let existing = live
                .iter()
                .find(|live| live.name.eq_ignore_ascii_case(&column.name));
            match existing {
                None => Some(MigrationOperation::add_column(physical, column)),
                Some(existing) if !dialect.same_type(&column.sql_type, &existing.data_type) => {
                    Some(MigrationOperation::modify_column(physical, column))
                }
                Some(_) => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;
    use serde_json::json;

    fn items() -> Table {
        Table::new(
            "items",
            &json!({
                "table": "items",
                "columns": {
                    "name": {"type": "string"},
                    "price": {"type": "currency"},
                    "qty": {"type": "integer"},
                }
            }),
        )
    }

    #[test]
    fn test_empty_live_table_is_created() {
        let ops = plan_table(&MySqlDialect::new(), &items(), &[]);
        assert_eq!(ops.len(), 1);

        let MigrationOperation::CreateTable { name, columns } = &ops[0] else {
            panic!("expected CreateTable, got {:?}", ops[0]);
        };
        assert_eq!(name, "items");
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "created_at", "updated_at", "name", "price", "qty"]
        );
        assert_eq!(columns[4].sql_type, "decimal");
    }

    #[test]
    fn test_missing_column_is_added() {
        let live = vec![
            LiveColumn::new("id", "int"),
            LiveColumn::new("name", "varchar"),
            LiveColumn::new("price", "decimal"),
            LiveColumn::new("legacy_flag", "tinyint"),
        ];
        let ops = plan_table(&MySqlDialect::new(), &items(), &live);
        assert_eq!(
            ops,
            vec![MigrationOperation::add_column(
                "items",
                ColumnSchema::new("qty", "int")
            )]
        );
    }

    #[test]
    fn test_type_change_is_modified() {
        let live = vec![
            LiveColumn::new("name", "varchar"),
            LiveColumn::new("price", "int"),
            LiveColumn::new("qty", "int"),
        ];
        let ops = plan_table(&MySqlDialect::new(), &items(), &live);
        assert_eq!(
            ops,
            vec![MigrationOperation::modify_column(
                "items",
                ColumnSchema::new("price", "decimal")
            )]
        );
    }

    #[test]
    fn test_matching_table_needs_nothing() {
        let live = vec![
            LiveColumn::new("NAME", "VARCHAR"),
            LiveColumn::new("price", "decimal"),
            LiveColumn::new("qty", "int"),
        ];
        assert!(plan_table(&MySqlDialect::new(), &items(), &live).is_empty());
    }

    #[test]
    fn test_implicit_columns_are_not_repeated() {
        let table = Table::new(
            "notes",
            &json!({"columns": {"id": {"type": "integer"}, "Created_At": {"type": "date"}, "body": {"type": "text"}}}),
        );

        let ops = plan_table(&MySqlDialect::new(), &table, &[]);
        let MigrationOperation::CreateTable { name, columns } = &ops[0] else {
            panic!("expected CreateTable");
        };
        assert_eq!(name, "notes");
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "created_at", "updated_at", "body"]);
    }

    #[test]
    fn test_operations_follow_declaration_order() {
        let live = vec![LiveColumn::new("id", "int")];
        let ops = plan_table(&MySqlDialect::new(), &items(), &live);
        let added: Vec<String> = ops
            .iter()
            .map(|op| match op {
                MigrationOperation::AddColumn { column, .. } => column.name.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(added, vec!["name", "price", "qty"]);
    }
}
