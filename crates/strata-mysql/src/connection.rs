//! sqlx-backed [`Connection`] for MySQL.

use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection as Session};
use sqlx::query::Query as SqlxQuery;
use sqlx::{ConnectOptions as _, Connection as _, Executor as _};
use strata_core::{Connection, Record, Result, Schema, SqlValue, StrataError};
use tracing::debug;

use crate::decode::decode_row;
use crate::settings::ConnectionSettings;

/// A MySQL database reached through one fresh session per statement.
///
/// Nothing is pooled and nothing survives between two calls, so no
/// transaction can span statements.
#[derive(Debug, Clone)]
pub struct MySqlConnection {
    settings: ConnectionSettings,
}

impl MySqlConnection {
    /// Creates a connection with explicit settings.
    #[must_use]
    pub const fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    /// Creates a connection whose settings are resolved from the
    /// environment and `schema`.
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        Self::new(ConnectionSettings::resolve(schema))
    }

    /// The resolved settings.
    #[must_use]
    pub const fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn admin_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.settings.host)
            .port(self.settings.port)
            .username(&self.settings.user)
            .password(&self.settings.password)
            .charset(&self.settings.charset)
    }

    fn options(&self) -> MySqlConnectOptions {
        self.admin_options().database(&self.settings.database)
    }

    async fn open(options: &MySqlConnectOptions) -> Result<Session> {
        options
            .connect()
            .await
            .map_err(|e| StrataError::ConnectionFailure(e.to_string()))
    }
}

impl Connection for MySqlConnection {
    fn database(&self) -> &str {
        &self.settings.database
    }

    async fn statement(&self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Record>> {
        debug!(sql = %sql, bindings = bindings.len(), "Executing statement");

        let mut session = Self::open(&self.options()).await?;

        let query = bindings
            .iter()
            .cloned()
            .fold(sqlx::query(sql), bind_value);

        let result = query.fetch_all(&mut session).await;
        // The session is dropped either way; a failed close is not the
        // statement's failure.
        let _ = session.close().await;

        let rows = result.map_err(|e| StrataError::statement(sql, e.to_string()))?;
        Ok(rows.iter().map(decode_row).collect())
    }

    async fn database_exists(&self) -> Result<bool> {
        let mut session = Self::open(&self.admin_options()).await?;
        let select = format!("use {}", quote_identifier(&self.settings.database));

        let selected = session.execute(sqlx::raw_sql(&select)).await;
        let _ = session.close().await;

        debug!(database = %self.settings.database, exists = selected.is_ok(), "Checked database");
        Ok(selected.is_ok())
    }

    async fn admin_statement(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing administrative statement");

        let mut session = Self::open(&self.admin_options()).await?;
        let result = session.execute(sqlx::raw_sql(sql)).await;
        let _ = session.close().await;

        result
            .map(|_| ())
            .map_err(|e| StrataError::statement(sql, e.to_string()))
    }
}

/// Quotes `name` as a MySQL identifier, doubling embedded backticks.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Binds a [`SqlValue`] parameter to a prepared query.
fn bind_value(
    query: SqlxQuery<'_, MySql, MySqlArguments>,
    value: SqlValue,
) -> SqlxQuery<'_, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> MySqlConnection {
        MySqlConnection::new(ConnectionSettings {
            database: "shop".to_string(),
            ..ConnectionSettings::default()
        })
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("shop"), "`shop`");
        assert_eq!(quote_identifier("my-db"), "`my-db`");
        assert_eq!(quote_identifier("x`; drop database y; --"), "`x``; drop database y; --`");
    }

    #[test]
    fn test_database_comes_from_settings() {
        assert_eq!(connection().database(), "shop");
    }

    #[test]
    fn test_from_schema_uses_declared_database() {
        let schema =
            Schema::from_json_str(r#"{"connection": {"database": "inventory"}}"#).unwrap();
        let conn = MySqlConnection::from_schema(&schema);
        if std::env::var("DB_NAME").is_err() {
            assert_eq!(conn.database(), "inventory");
        }
    }

    #[test]
    fn test_admin_options_select_no_database() {
        let conn = connection();
        assert_eq!(conn.admin_options().get_database(), None);
        assert_eq!(conn.options().get_database(), Some("shop"));
    }
}
