//! Row wrapper with schema-validated writes.
//!
//! A [`Model`] holds one row of a declared table as a [`Record`]. Values
//! are read back through typed accessors and written through
//! [`Model::set`], which only accepts declared columns plus the implicit
//! `id`, `created_at` and `updated_at`.

use serde_json::Value;
use strata_core::{Connection, Query, Record, SqlValue, Table, ToSqlValue};
use tracing::debug;

use crate::context::Context;
use crate::error::{OrmError, Result};

/// Columns every migrated table carries besides its declared ones.
pub const IMPLICIT_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of a declared table.
///
/// # Example
///
/// ```rust
/// use strata_core::{Record, Schema, ScriptedConnection};
/// use strata_orm::Context;
///
/// # tokio_test::block_on(async {
/// let schema = Schema::from_json_str(
///     r#"{"tables": {"items": {"columns": {"name": {"type": "string"}}}}}"#,
/// ).unwrap();
/// let conn = ScriptedConnection::new("shop")
///     .respond_when("select * from items", vec![Record::new().with("id", 1).with("name", "bolt")]);
/// let ctx = Context::new(schema, conn);
///
/// let mut item = ctx.model("items").unwrap();
/// item.set("name", "bolt").unwrap();
/// assert!(item.set("colour", "red").is_err());
///
/// assert!(item.save().await.unwrap());
/// assert_eq!(item.id(), Some(1));
/// # });
/// ```
#[derive(Debug)]
pub struct Model<'a, C: Connection> {
    ctx: &'a Context<C>,
    table: &'a Table,
    record: Record,
}

impl<'a, C: Connection> Model<'a, C> {
    /// Creates an empty, unsaved model for the table under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownTable`] for an undeclared key.
    pub fn new(ctx: &'a Context<C>, key: &str) -> Result<Self> {
        let table = ctx.table(key)?;
        Ok(Self::from_record(ctx, table, Record::new()))
    }

    /// Wraps an existing row.
    #[must_use]
    pub const fn from_record(ctx: &'a Context<C>, table: &'a Table, record: Record) -> Self {
        Self { ctx, table, record }
    }

    /// The table definition.
    #[must_use]
    pub const fn table(&self) -> &Table {
        self.table
    }

    /// The underlying row.
    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    /// Consumes the model, returning the row.
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// The primary key, once the row has been saved.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.record.get("id").and_then(SqlValue::as_int)
    }

    /// Whether the row exists in the database.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id().is_some()
    }

    /// Raw value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.record.get(column)
    }

    /// Text value of `column`.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_text)
    }

    /// Integer value of `column`; numeric text is parsed.
    #[must_use]
    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_int)
    }

    /// Float value of `column`; numeric text such as a decimal is parsed.
    #[must_use]
    pub fn float(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(SqlValue::as_float)
    }

    /// Boolean value of `column`.
    #[must_use]
    pub fn bool(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(SqlValue::as_bool)
    }

    fn accepts(&self, column: &str) -> bool {
        IMPLICIT_COLUMNS.contains(&column) || self.table.has_column(column)
    }

    /// Sets `column` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownColumn`] when `column` is neither declared
    /// nor implicit; the model is left unchanged.
    pub fn set(&mut self, column: &str, value: impl ToSqlValue) -> Result<&mut Self> {
        if !self.accepts(column) {
            return Err(OrmError::UnknownColumn {
                table: self.table.key().to_string(),
                column: column.to_string(),
            });
        }
        self.record.insert(column, value);
        Ok(self)
    }

    /// Sets every entry of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownColumn`] for the first unknown column;
    /// nothing is set in that case.
    pub fn fill(&mut self, values: Record) -> Result<&mut Self> {
        if let Some(column) = values.keys().find(|column| !self.accepts(column)) {
            return Err(OrmError::UnknownColumn {
                table: self.table.key().to_string(),
                column: column.to_string(),
            });
        }
        for (column, value) in values {
            self.record.insert(column, value);
        }
        Ok(self)
    }

    /// Persists the row.
    ///
    /// An unsaved row is stamped with `created_at` and `updated_at`, inserted,
    /// and replaced by the row read back from the table. A saved row is
    /// stamped with `updated_at` and updated by `id`.
    ///
    /// Returns whether the database reported the write.
    ///
    /// # Errors
    ///
    /// Returns a database error when a statement fails, or
    /// [`OrmError::NotReadBack`] when an insert went through but the
    /// read-back found no row; the model then keeps its stamped values.
    pub async fn save(&mut self) -> Result<bool> {
        let now = chrono::Local::now()
            .naive_local()
            .format(TIMESTAMP_FORMAT)
            .to_string();

        if let Some(id) = self.id() {
            return self.update_row(id, now).await;
        }
        self.insert_row(now).await
    }

    async fn insert_row(&mut self, now: String) -> Result<bool> {
        self.record.remove("id");
        self.record.insert("created_at", now.as_str());
        self.record.insert("updated_at", now);
        debug!(table = %self.table.key(), "Inserting model");

        let created = Query::new()
            .table(self.table.physical_name())
            .create(self.ctx.connection(), &self.record)
            .await?;
        let Some(row) = created else {
            return Err(OrmError::NotReadBack(self.table.key().to_string()));
        };
        self.record = row;
        Ok(true)
    }

    async fn update_row(&mut self, id: i64, now: String) -> Result<bool> {
        self.record.insert("updated_at", now);
        debug!(table = %self.table.key(), id, "Updating model");

        let values: Record = self
            .record
            .iter()
            .filter(|(column, _)| *column != "id")
            .map(|(column, value)| (column, value.clone()))
            .collect();
        let updated = Query::new()
            .table(self.table.physical_name())
            .and_where("id", "=", id)
            .update(self.ctx.connection(), values)
            .await?;
        Ok(updated)
    }

    /// Reloads the row from the database by `id`.
    ///
    /// Returns `false`, leaving the model untouched, when the row is unsaved
    /// or no longer exists.
    ///
    /// # Errors
    ///
    /// Returns a database error when the query fails.
    pub async fn refresh(&mut self) -> Result<bool> {
        let Some(id) = self.id() else {
            return Ok(false);
        };
        let row = Query::new()
            .table(self.table.physical_name())
            .and_where("id", "=", id)
            .first(self.ctx.connection())
            .await?;
        let Some(row) = row else {
            return Ok(false);
        };
        self.record = row;
        Ok(true)
    }

    /// Renders the row as a JSON object, columns in row order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.record.to_json()
    }
}
