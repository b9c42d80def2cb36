//! Declarative schema definitions.
//!
//! Columns, tables, and the schema itself are built from a raw JSON
//! document by filling a declared default shape. Building never fails:
//! every declared field either takes the raw value or its default, so
//! accessors never have to deal with missing data.

mod column;
mod schema;
mod table;

pub use column::Column;
pub use schema::Schema;
pub use table::Table;

use serde_json::{Map, Value};

/// Fills `shape` with values from `raw`.
///
/// For each key of the declared shape: when the shape's default is a
/// non-empty object and `raw` carries the key, the nested shape is filled
/// recursively; otherwise the raw value is taken if present, else the
/// default. Keys in `raw` that the shape does not declare are dropped.
/// A non-object shape is a leaf default and is replaced by any non-null
/// `raw`.
#[must_use]
pub fn fill_defaults(shape: &Value, raw: &Value) -> Value {
    let Some(fields) = shape.as_object() else {
        return if raw.is_null() {
            shape.clone()
        } else {
            raw.clone()
        };
    };

    let mut filled = Map::with_capacity(fields.len());
    for (key, default) in fields {
        let value = match (default, raw.get(key)) {
            (Value::Object(nested), Some(given)) if !nested.is_empty() => {
                fill_defaults(default, given)
            }
            (_, Some(given)) => given.clone(),
            (_, None) => default.clone(),
        };
        filled.insert(key.clone(), value);
    }
    Value::Object(filled)
}

/// A definition type constructed from a declared shape.
pub trait Definition: Sized {
    /// The declared fields and their defaults.
    fn shape() -> Value;

    /// Builds the definition from an already filled object.
    fn from_filled(data: &Map<String, Value>) -> Self;

    /// Fills the shape from `raw` and builds the definition.
    fn from_raw(raw: &Value) -> Self {
        match fill_defaults(&Self::shape(), raw) {
            Value::Object(data) => Self::from_filled(&data),
            _ => Self::from_filled(&Map::new()),
        }
    }
}

/// Reads a string field. Scalars are stringified, anything else is empty.
pub(crate) fn text_field(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads a boolean field, falling back to `default` for non-booleans.
pub(crate) fn bool_field(data: &Map<String, Value>, key: &str, default: bool) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(default)
}
