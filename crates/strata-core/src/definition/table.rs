//! Table definitions.

use serde_json::{json, Map, Value};

use super::{text_field, Column, Definition};

/// A declared table.
///
/// Columns keep the order they were declared in; the migrator emits
/// statements in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    key: String,
    name: String,
    table: String,
    single: String,
    columns: Vec<(String, Column)>,
    relations: Value,
}

impl Definition for Table {
    fn shape() -> Value {
        json!({
            "name": "",
            "table": "",
            "single": "",
            "columns": {},
            "relations": {},
        })
    }

    fn from_filled(data: &Map<String, Value>) -> Self {
        let columns = data
            .get("columns")
            .and_then(Value::as_object)
            .map(|columns| {
                columns
                    .iter()
                    .map(|(key, raw)| (key.clone(), Column::new(raw)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            key: String::new(),
            name: text_field(data, "name"),
            table: text_field(data, "table"),
            single: text_field(data, "single"),
            columns,
            relations: data.get("relations").cloned().unwrap_or(Value::Null),
        }
    }
}

impl Table {
    /// Builds the table declared under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, raw: &Value) -> Self {
        Self {
            key: key.into(),
            ..Self::from_raw(raw)
        }
    }

    /// The schema key this table was declared under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Logical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared physical table name (may be empty).
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Physical table name, falling back to the schema key when none was
    /// declared.
    #[must_use]
    pub fn physical_name(&self) -> &str {
        if self.table.is_empty() {
            &self.key
        } else {
            &self.table
        }
    }

    /// Singular display name.
    #[must_use]
    pub fn single(&self) -> &str {
        &self.single
    }

    /// Declared columns, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(key, column)| (key.as_str(), column))
    }

    /// Number of declared columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether a column is declared under `key`.
    #[must_use]
    pub fn has_column(&self, key: &str) -> bool {
        self.get_column(key).is_some()
    }

    /// Returns the column declared under `key`.
    #[must_use]
    pub fn get_column(&self, key: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, column)| column)
    }

    /// Relation declarations, passed through untouched.
    #[must_use]
    pub const fn relations(&self) -> &Value {
        &self.relations
    }
}
