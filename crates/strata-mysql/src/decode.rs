//! Row decoding by reported MySQL column type.

use sqlx::mysql::MySqlRow;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use strata_core::{Record, SqlValue};

/// Converts a MySQL row into a [`Record`], keyed by column label.
///
/// Decimals and temporal values become text so no precision is lost;
/// values that fail to decode as their reported type fall back to text,
/// then to bytes.
#[must_use]
pub fn decode_row(row: &MySqlRow) -> Record {
    row.columns()
        .iter()
        .map(|column| {
            let idx = column.ordinal();
            let type_name = column.type_info().name().to_lowercase();
            (column.name().to_string(), decode_value(row, idx, &type_name))
        })
        .collect()
}

fn decode_value(row: &MySqlRow, idx: usize, type_name: &str) -> SqlValue {
    let is_null = !row.try_get_raw(idx).is_ok_and(|raw| !raw.is_null());
    if is_null {
        return SqlValue::Null;
    }

    let (base, unsigned) = split_type_name(type_name);

    let decoded = match base {
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "year" => {
            if unsigned {
                row.try_get::<u64, _>(idx)
                    .ok()
                    .and_then(|n| i64::try_from(n).ok())
                    .map(SqlValue::Int)
            } else {
                row.try_get::<i64, _>(idx).ok().map(SqlValue::Int)
            }
        }
        "boolean" | "bool" => row.try_get::<bool, _>(idx).ok().map(SqlValue::Bool),
        "float" => row
            .try_get::<f32, _>(idx)
            .ok()
            .map(|n| SqlValue::Float(f64::from(n))),
        "double" | "real" => row.try_get::<f64, _>(idx).ok().map(SqlValue::Float),
        "decimal" | "numeric" => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .ok()
            .map(|n| SqlValue::Text(n.to_string())),
        "date" => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .ok()
            .map(|d| SqlValue::Text(d.format("%Y-%m-%d").to_string())),
        "time" => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .ok()
            .map(|t| SqlValue::Text(t.format("%H:%M:%S").to_string())),
        "datetime" | "timestamp" => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .ok()
            .map(|dt| SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string())),
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "bit" => {
            row.try_get::<Vec<u8>, _>(idx).ok().map(SqlValue::Blob)
        }
        _ => None,
    };

    decoded.unwrap_or_else(|| fallback(row, idx))
}

/// Splits a reported type name such as `int unsigned` into its base name
/// and signedness.
fn split_type_name(type_name: &str) -> (&str, bool) {
    let base = type_name.split_whitespace().next().unwrap_or_default();
    (base, type_name.ends_with("unsigned"))
}

fn fallback(row: &MySqlRow, idx: usize) -> SqlValue {
    if let Ok(text) = row.try_get::<String, _>(idx) {
        return SqlValue::Text(text);
    }
    row.try_get_unchecked::<Vec<u8>, _>(idx)
        .map_or(SqlValue::Null, |bytes| match String::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text),
            Err(err) => SqlValue::Blob(err.into_bytes()),
        })
}
