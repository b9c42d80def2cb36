//! Column definitions and the logical to physical type mapping.

use serde_json::{json, Map, Value};

use super::{bool_field, text_field, Definition};

/// Physical type used for unknown and string-like logical types.
pub const DEFAULT_SQL_TYPE: &str = "varchar(191)";

/// A declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: String,
    default: Value,
    nullable: bool,
}

impl Definition for Column {
    fn shape() -> Value {
        json!({
            "name": "",
            "type": "",
            "default": "",
            "nullable": true,
        })
    }

    fn from_filled(data: &Map<String, Value>) -> Self {
        Self {
            name: text_field(data, "name"),
            column_type: text_field(data, "type"),
            default: data.get("default").cloned().unwrap_or(Value::Null),
            nullable: bool_field(data, "nullable", true),
        }
    }
}

impl Column {
    /// Builds a column from its raw declaration.
    #[must_use]
    pub fn new(raw: &Value) -> Self {
        Self::from_raw(raw)
    }

    /// Builds a column of the given logical type with every other field
    /// defaulted.
    #[must_use]
    pub fn of_type(column_type: &str) -> Self {
        Self::from_raw(&json!({ "type": column_type }))
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type tag, as declared.
    #[must_use]
    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    /// Declared default value.
    #[must_use]
    pub const fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether the column accepts NULL.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Physical MySQL type for the logical type.
    ///
    /// Case-insensitive; unknown types map to `varchar(191)`.
    #[must_use]
    pub fn sql_type(&self) -> &'static str {
        match self.column_type.trim().to_lowercase().as_str() {
            "date" | "datetime" => "datetime",
            "currency" | "decimal" | "float" => "decimal",
            "integer" => "int",
            "text" => "text",
            "longtext" => "longtext",
            _ => DEFAULT_SQL_TYPE,
        }
    }
}
