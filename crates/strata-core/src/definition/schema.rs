//! The schema document: connection parameters plus declared tables.

use std::path::Path;

use serde_json::{json, Map, Value};

use super::{text_field, Definition, Table};
use crate::error::Result;

/// The full declared database shape.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    host: String,
    user: String,
    password: String,
    database: String,
    tables: Vec<Table>,
}

impl Definition for Schema {
    fn shape() -> Value {
        json!({
            "connection": {
                "host": "",
                "user": "",
                "password": "",
                "database": "",
            },
            "tables": {},
        })
    }

    fn from_filled(data: &Map<String, Value>) -> Self {
        let connection = data
            .get("connection")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let tables = data
            .get("tables")
            .and_then(Value::as_object)
            .map(|tables| {
                tables
                    .iter()
                    .map(|(key, raw)| Table::new(key.clone(), raw))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: text_field(&connection, "host"),
            user: text_field(&connection, "user"),
            password: text_field(&connection, "password"),
            database: text_field(&connection, "database"),
            tables,
        }
    }
}

impl Schema {
    /// Builds a schema from a parsed document.
    #[must_use]
    pub fn from_value(raw: &Value) -> Self {
        Self::from_raw(raw)
    }

    /// Parses a JSON schema document.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidDocument`](crate::StrataError) when the
    /// text is not JSON. Missing or wrong-typed fields are defaulted.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&raw))
    }

    /// Reads and parses a JSON schema file.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file cannot be read, or a document
    /// error when it is not JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Declared host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Declared user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Declared password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Declared database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Declared tables, in document order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Returns the table declared under `key`.
    #[must_use]
    pub fn get_table(&self, key: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.key() == key)
    }
}
