//! The explicit handle every model works through.

use strata_core::{Connection, Query, Schema, Table};

use crate::error::{OrmError, Result};
use crate::model::Model;

/// Owns the declared [`Schema`] and the [`Connection`] for one database.
///
/// Models borrow the context, so one context can serve any number of
/// models for as long as it lives.
#[derive(Debug)]
pub struct Context<C: Connection> {
    schema: Schema,
    conn: C,
}

impl<C: Connection> Context<C> {
    /// Creates a context.
    #[must_use]
    pub const fn new(schema: Schema, conn: C) -> Self {
        Self { schema, conn }
    }

    /// The declared schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The connection.
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// Returns the table declared under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownTable`] when no table is declared under
    /// `key`.
    pub fn table(&self, key: &str) -> Result<&Table> {
        self.schema
            .get_table(key)
            .ok_or_else(|| OrmError::UnknownTable(key.to_string()))
    }

    /// Starts a query against the physical table declared under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownTable`] for an undeclared key.
    pub fn query(&self, key: &str) -> Result<Query> {
        Ok(Query::new().table(self.table(key)?.physical_name()))
    }

    /// Creates an empty, unsaved model for the table under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownTable`] for an undeclared key.
    pub fn model(&self, key: &str) -> Result<Model<'_, C>> {
        Model::new(self, key)
    }

    /// Loads the row with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownTable`] for an undeclared key, or a
    /// database error when the query fails.
    pub async fn find(&self, key: &str, id: i64) -> Result<Option<Model<'_, C>>> {
        let table = self.table(key)?;
        let model = self
            .query(key)?
            .and_where("id", "=", id)
            .first_with(&self.conn, |record| Model::from_record(self, table, record))
            .await?;
        Ok(model)
    }

    /// Runs `query` and wraps every row as a model of the table under
    /// `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnknownTable`] for an undeclared key, or a
    /// database error when the query fails.
    pub async fn fetch(&self, key: &str, query: Query) -> Result<Vec<Model<'_, C>>> {
        let table = self.table(key)?;
        let models = query
            .get_with(&self.conn, |record| Model::from_record(self, table, record))
            .await?;
        Ok(models)
    }

    /// Loads every row of the table under `key`.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn all(&self, key: &str) -> Result<Vec<Model<'_, C>>> {
        self.fetch(key, self.query(key)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Record, ScriptedConnection};

    fn context() -> Context<ScriptedConnection> {
        let schema = Schema::from_json_str(
            r#"{"tables": {"posts": {"table": "blog_posts", "columns": {"title": {}}}}}"#,
        )
        .unwrap();
        let conn = ScriptedConnection::new("blog").respond_when(
            "from blog_posts",
            vec![
                Record::new().with("id", 1).with("title", "Hello"),
                Record::new().with("id", 2).with("title", "World"),
            ],
        );
        Context::new(schema, conn)
    }

    #[test]
    fn test_unknown_table() {
        let ctx = context();
        assert!(matches!(ctx.table("users"), Err(OrmError::UnknownTable(ref key)) if key == "users"));
        assert!(ctx.query("users").is_err());
    }

    #[test]
    fn test_query_targets_physical_table() {
        let ctx = context();
        assert_eq!(
            ctx.query("posts").unwrap().statement(),
            "select * from blog_posts"
        );
    }

    #[tokio::test]
    async fn test_all_wraps_rows() {
        let ctx = context();
        let posts = ctx.all("posts").await.unwrap();
        let titles: Vec<Option<&str>> = posts.iter().map(|p| p.text("title")).collect();
        assert_eq!(titles, vec![Some("Hello"), Some("World")]);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let ctx = context();
        let post = ctx.find("posts", 1).await.unwrap().unwrap();
        assert_eq!(post.id(), Some(1));

        let executed = ctx.connection().executed();
        assert_eq!(
            executed[0].sql,
            "select * from blog_posts where id = ? limit 1"
        );
    }
}
