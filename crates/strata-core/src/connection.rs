//! The statement-execution seam and a scripted in-memory implementation.
//!
//! Everything that talks to a database does so through [`Connection`]:
//! the query builder's terminal operations, the migrator, and the model
//! layer. Driver crates provide real implementations; [`ScriptedConnection`]
//! records statements and answers from canned rules.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use crate::error::{Result, StrataError};
use crate::query::Query;
use crate::value::{Record, SqlValue};

/// Executes parameterized statements against one database.
///
/// Implementations open a fresh session for every call; nothing (open
/// transactions, temporary tables) survives between two statements.
///
/// Every returned future is `Send`, so code generic over a connection can
/// run on a multi-threaded runtime. Implementations may use `async fn`.
pub trait Connection: Sync {
    /// Name of the target database.
    fn database(&self) -> &str;

    /// Prepares and executes `sql` with positional `bindings`, returning
    /// every result row.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::StatementFailure`] carrying the driver's
    /// error text when the statement cannot be prepared or executed.
    fn statement(
        &self,
        sql: &str,
        bindings: &[SqlValue],
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Executes a built query's SELECT with its condition bindings.
    ///
    /// # Errors
    ///
    /// See [`statement`](Self::statement).
    fn execute(&self, query: &Query) -> impl Future<Output = Result<Vec<Record>>> + Send {
        let sql = query.statement();
        let bindings = query.condition_bindings().to_vec();
        async move { self.statement(&sql, &bindings).await }
    }

    /// Checks, on a session with no database selected, whether the target
    /// database can be selected.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::ConnectionFailure`] when the server cannot be
    /// reached.
    fn database_exists(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Runs a statement on a session with no database selected.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::ConnectionFailure`] when the server cannot be
    /// reached, or a statement failure when the server rejects `sql`.
    fn admin_statement(&self, sql: &str) -> impl Future<Output = Result<()>> + Send;
}

/// A statement seen by a [`ScriptedConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    /// The SQL text.
    pub sql: String,
    /// The bound values, in placeholder order.
    pub bindings: Vec<SqlValue>,
    /// Whether it ran on an administrative (no database) session.
    pub admin: bool,
}

#[derive(Debug, Clone)]
enum Reply {
    Rows(Vec<Record>),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Rule {
    fragment: String,
    reply: Reply,
}

/// An in-memory [`Connection`] that records statements and answers from
/// scripted rules.
///
/// Rules match when their fragment occurs in the statement (ASCII case
/// insensitive); the first matching rule wins and unmatched statements
/// return no rows.
///
/// ```rust
/// use strata_core::{Connection, Query, Record, ScriptedConnection};
///
/// # tokio_test::block_on(async {
/// let conn = ScriptedConnection::new("shop")
///     .respond_when("from items", vec![Record::new().with("id", 1)]);
///
/// let rows = Query::new().table("items").get(&conn).await.unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(conn.statements(), vec!["select * from items"]);
/// # });
/// ```
#[derive(Debug)]
pub struct ScriptedConnection {
    database: String,
    rules: Vec<Rule>,
    database_present: bool,
    connect_failure: Option<String>,
    log: Mutex<Vec<ExecutedStatement>>,
}

impl ScriptedConnection {
    /// Creates a connection to `database` that has no rules and reports the
    /// database as present.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            rules: Vec::new(),
            database_present: true,
            connect_failure: None,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Answers statements containing `fragment` with `rows`.
    #[must_use]
    pub fn respond_when(mut self, fragment: &str, rows: Vec<Record>) -> Self {
        self.rules.push(Rule {
            fragment: fragment.to_ascii_lowercase(),
            reply: Reply::Rows(rows),
        });
        self
    }

    /// Fails statements containing `fragment` with `detail`.
    #[must_use]
    pub fn fail_when(mut self, fragment: &str, detail: &str) -> Self {
        self.rules.push(Rule {
            fragment: fragment.to_ascii_lowercase(),
            reply: Reply::Fail(detail.to_string()),
        });
        self
    }

    /// Sets whether the target database already exists.
    #[must_use]
    pub const fn with_database_present(mut self, present: bool) -> Self {
        self.database_present = present;
        self
    }

    /// Makes every administrative session fail to connect.
    #[must_use]
    pub fn fail_connect(mut self, detail: &str) -> Self {
        self.connect_failure = Some(detail.to_string());
        self
    }

    /// Every statement executed so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The SQL text of every statement executed so far, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.executed().into_iter().map(|s| s.sql).collect()
    }

    fn record(&self, sql: &str, bindings: &[SqlValue], admin: bool) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutedStatement {
                sql: sql.to_string(),
                bindings: bindings.to_vec(),
                admin,
            });
    }

    fn reply(&self, sql: &str) -> Result<Vec<Record>> {
        let lowered = sql.to_ascii_lowercase();
        match self
            .rules
            .iter()
            .find(|rule| lowered.contains(&rule.fragment))
            .map(|rule| &rule.reply)
        {
            Some(Reply::Rows(rows)) => Ok(rows.clone()),
            Some(Reply::Fail(detail)) => Err(StrataError::statement(sql, detail.clone())),
            None => Ok(Vec::new()),
        }
    }
}

impl Connection for ScriptedConnection {
    fn database(&self) -> &str {
        &self.database
    }

    async fn statement(&self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Record>> {
        self.record(sql, bindings, false);
        self.reply(sql)
    }

    async fn database_exists(&self) -> Result<bool> {
        if let Some(detail) = &self.connect_failure {
            return Err(StrataError::ConnectionFailure(detail.clone()));
        }
        Ok(self.database_present)
    }

    async fn admin_statement(&self, sql: &str) -> Result<()> {
        if let Some(detail) = &self.connect_failure {
            return Err(StrataError::ConnectionFailure(detail.clone()));
        }
        self.record(sql, &[], true);
        self.reply(sql).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_statements_and_bindings() {
        let conn = ScriptedConnection::new("app");
        conn.statement("select 1 from dual where a = ?", &[SqlValue::Int(3)])
            .await
            .unwrap();

        let executed = conn.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].bindings, vec![SqlValue::Int(3)]);
        assert!(!executed[0].admin);
    }

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let conn = ScriptedConnection::new("app")
            .fail_when("FROM broken", "no such table")
            .respond_when("from", vec![Record::new().with("n", 1)]);

        let err = conn.statement("select * from broken", &[]).await.unwrap_err();
        assert!(matches!(err, StrataError::StatementFailure { ref detail, .. } if detail == "no such table"));

        let rows = conn.statement("select * from fine", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_session_failure() {
        let conn = ScriptedConnection::new("app").fail_connect("refused");
        assert!(matches!(
            conn.database_exists().await,
            Err(StrataError::ConnectionFailure(_))
        ));
        assert!(conn.admin_statement("create database app").await.is_err());
        assert!(conn.executed().is_empty());
    }
}
