//! Fluent builder for parameterized statements.
//!
//! A [`Query`] accumulates a target table, a projection, condition
//! fragments with their bindings, ordering, and limit/offset. Every value
//! becomes a positional `?` binding. The i-th placeholder of the SELECT
//! binds `condition_bindings()[i]`, and the i-th placeholder of the UPDATE
//! binds `bindings()[i]`, including when conditions are composed from
//! nested queries.
//!
//! ```rust
//! use strata_core::{Query, SqlValue};
//!
//! let active_or_admin = Query::new()
//!     .and_where("status", "=", "active")
//!     .or_where("role", "=", "admin");
//!
//! let query = Query::new()
//!     .table("users")
//!     .select(["id", "email"])
//!     .and_where("age", ">", 18)
//!     .and_group(active_or_admin)
//!     .order_by("id", "desc")
//!     .limit(10);
//!
//! assert_eq!(
//!     query.statement(),
//!     "select id, email from users where age > ? and (status = ? or role = ?) \
//!      order by id desc limit 10"
//! );
//! assert_eq!(
//!     query.bindings(),
//!     &[
//!         SqlValue::Int(18),
//!         SqlValue::Text("active".into()),
//!         SqlValue::Text("admin".into()),
//!     ]
//! );
//! ```

use crate::connection::Connection;
use crate::error::Result;
use crate::value::{Record, SqlValue, ToSqlValue};

/// How a condition joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joiner {
    And,
    Or,
}

impl Joiner {
    const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// A mutable, single-owner statement builder.
///
/// Chained calls take and return the builder by value. Terminal
/// operations (`get`, `first`, `insert`, `update`, `create`) consume it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    assignments: Vec<String>,
    conditions: Vec<String>,
    // SET bindings first, one per assignment, then condition bindings.
    bindings: Vec<SqlValue>,
    orders: Vec<String>,
    limit: u64,
    offset: u64,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target table. The name is not validated.
    #[must_use]
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
        self
    }

    /// Restricts the projection. An empty list selects `*`.
    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds `field op ?` joined with `and`, binding `value`.
    #[must_use]
    pub fn and_where(self, field: &str, op: &str, value: impl ToSqlValue) -> Self {
        self.push_condition(Joiner::And, field, op, value.to_sql_value())
    }

    /// Adds `field op ?` joined with `or`, binding `value`.
    #[must_use]
    pub fn or_where(self, field: &str, op: &str, value: impl ToSqlValue) -> Self {
        self.push_condition(Joiner::Or, field, op, value.to_sql_value())
    }

    /// Adds `sub`'s conditions as one parenthesized group joined with `and`.
    ///
    /// `sub`'s bindings are appended, in their own order, after every
    /// binding this query already holds.
    #[must_use]
    pub fn and_group(self, sub: Self) -> Self {
        self.push_group(Joiner::And, sub)
    }

    /// Adds `sub`'s conditions as one parenthesized group joined with `or`.
    #[must_use]
    pub fn or_group(self, sub: Self) -> Self {
        self.push_group(Joiner::Or, sub)
    }

    /// Appends an ordering term. Terms are emitted in call order.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: &str) -> Self {
        self.orders.push(format!("{field} {direction}"));
        self
    }

    /// Sets the row limit. Zero means no limit.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = n;
        self
    }

    /// Sets the row offset.
    ///
    /// The offset is only emitted together with a limit.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = n;
        self
    }

    /// Adds SET assignments for [`update`](Self::update).
    ///
    /// Their bindings are placed before every condition binding, since the
    /// SET clause precedes the WHERE clause in the emitted SQL. A column
    /// already assigned keeps its position and takes the new value.
    #[must_use]
    pub fn set(mut self, values: Record) -> Self {
        for (column, value) in values {
            if let Some(index) = self.assignments.iter().position(|c| *c == column) {
                self.bindings[index] = value;
                continue;
            }
            self.bindings.insert(self.assignments.len(), value);
            self.assignments.push(column);
        }
        self
    }

    fn push_condition(mut self, joiner: Joiner, field: &str, op: &str, value: SqlValue) -> Self {
        let fragment = format!("{field} {op} ?");
        self.push_fragment(joiner, fragment);
        self.bindings.push(value);
        self
    }

    fn push_group(mut self, joiner: Joiner, sub: Self) -> Self {
        if sub.conditions.is_empty() {
            return self;
        }
        let fragment = format!("({})", sub.joined_conditions());
        self.push_fragment(joiner, fragment);
        self.bindings
            .extend(sub.bindings.into_iter().skip(sub.assignments.len()));
        self
    }

    fn push_fragment(&mut self, joiner: Joiner, fragment: String) {
        if self.conditions.is_empty() {
            self.conditions.push(fragment);
        } else {
            self.conditions
                .push(format!("{} {fragment}", joiner.keyword()));
        }
    }

    /// The target table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Every binding in [`update_statement`](Self::update_statement)
    /// placeholder order: SET bindings, then condition bindings.
    #[must_use]
    pub fn bindings(&self) -> &[SqlValue] {
        &self.bindings
    }

    /// The bindings of the condition fragments only, in
    /// [`statement`](Self::statement) placeholder order.
    #[must_use]
    pub fn condition_bindings(&self) -> &[SqlValue] {
        &self.bindings[self.assignments.len()..]
    }

    /// The condition fragments joined into one expression.
    #[must_use]
    pub fn joined_conditions(&self) -> String {
        self.conditions.join(" ").trim().to_string()
    }

    fn select_clause(&self) -> String {
        let fields = if self.columns.is_empty() {
            String::from("*")
        } else {
            self.columns.join(", ")
        };
        format!("select {fields} from {}", self.table)
    }

    fn where_clause(&self) -> String {
        let joined = self.joined_conditions();
        if joined.is_empty() {
            joined
        } else {
            format!("where {joined}")
        }
    }

    fn order_clause(&self) -> String {
        if self.orders.is_empty() {
            String::new()
        } else {
            format!("order by {}", self.orders.join(", "))
        }
    }

    fn limit_clause(&self) -> String {
        if self.limit > 0 {
            format!("limit {}", self.limit)
        } else {
            String::new()
        }
    }

    fn offset_clause(&self) -> String {
        if self.limit > 0 && self.offset > 0 {
            format!("offset {}", self.offset)
        } else {
            String::new()
        }
    }

    /// Compiles the SELECT statement.
    #[must_use]
    pub fn statement(&self) -> String {
        let clauses = [
            self.select_clause(),
            self.where_clause(),
            self.order_clause(),
            self.limit_clause(),
            self.offset_clause(),
        ];
        clauses
            .iter()
            .filter(|clause| !clause.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// Compiles the SELECT statement and returns it with its bindings.
    #[must_use]
    pub fn into_parts(mut self) -> (String, Vec<SqlValue>) {
        let sql = self.statement();
        let bindings = self.bindings.split_off(self.assignments.len());
        (sql, bindings)
    }

    /// Compiles an INSERT of `values` into the target table.
    #[must_use]
    pub fn insert_statement(&self, values: &Record) -> (String, Vec<SqlValue>) {
        let columns: Vec<&str> = values.keys().collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "insert into {} ({}) values ({placeholders})",
            self.table,
            columns.join(", ")
        );
        (sql, values.values().cloned().collect())
    }

    /// Compiles the UPDATE statement from the SET assignments and the
    /// conditions. Pair it with [`bindings`](Self::bindings).
    #[must_use]
    pub fn update_statement(&self) -> String {
        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect();
        let mut sql = format!("update {} set {}", self.table, assignments.join(", "));
        let where_clause = self.where_clause();
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        sql
    }

    /// Executes the SELECT and returns every row.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure.
    pub async fn get<C: Connection>(self, conn: &C) -> Result<Vec<Record>> {
        self.get_with(conn, |record| record).await
    }

    /// Executes the SELECT and maps every row through `hook`.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure.
    pub async fn get_with<C, T, F>(self, conn: &C, hook: F) -> Result<Vec<T>>
    where
        C: Connection,
        F: FnMut(Record) -> T + Send,
    {
        let rows = conn.execute(&self).await?;
        Ok(rows.into_iter().map(hook).collect())
    }

    /// Executes the SELECT with `limit 1` and returns the row, if any.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure.
    pub async fn first<C: Connection>(self, conn: &C) -> Result<Option<Record>> {
        self.first_with(conn, |record| record).await
    }

    /// Like [`first`](Self::first), mapping the row through `hook`.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure.
    pub async fn first_with<C, T, F>(self, conn: &C, hook: F) -> Result<Option<T>>
    where
        C: Connection,
        F: FnMut(Record) -> T + Send,
    {
        let rows = self.limit(1).get_with(conn, hook).await?;
        Ok(rows.into_iter().next())
    }

    /// Inserts `values` into the target table.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure.
    pub async fn insert<C: Connection>(self, conn: &C, values: &Record) -> Result<bool> {
        let (sql, bindings) = self.insert_statement(values);
        conn.statement(&sql, &bindings).await?;
        Ok(true)
    }

    /// Inserts `values`, then reads back the newest row of the table.
    ///
    /// The read-back selects the highest `id`, so a concurrent insert into
    /// the same table between the two statements returns the wrong row.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure from either statement.
    pub async fn create<C: Connection>(self, conn: &C, values: &Record) -> Result<Option<Record>> {
        let table = self.table.clone();
        self.insert(conn, values).await?;
        Self::new()
            .table(table)
            .order_by("id", "desc")
            .first(conn)
            .await
    }

    /// Updates the rows matching the conditions with `values`.
    ///
    /// Returns `false` without touching the database when `values` and any
    /// earlier [`set`](Self::set) calls hold no assignment.
    ///
    /// # Errors
    ///
    /// Propagates the connection's statement failure.
    pub async fn update<C: Connection>(self, conn: &C, values: Record) -> Result<bool> {
        let query = self.set(values);
        if query.assignments.is_empty() {
            return Ok(false);
        }
        conn.statement(&query.update_statement(), query.bindings())
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn test_select_all_by_default() {
        let query = Query::new().table("users");
        assert_eq!(query.statement(), "select * from users");
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn test_select_columns() {
        let query = Query::new().table("users").select(["id", "name"]);
        assert_eq!(query.statement(), "select id, name from users");
    }

    #[test]
    fn test_empty_select_list_means_star() {
        let query = Query::new().table("users").select(Vec::<String>::new());
        assert_eq!(query.statement(), "select * from users");
    }

    #[test]
    fn test_first_condition_has_no_prefix() {
        let query = Query::new().table("users").or_where("id", "=", 1);
        assert_eq!(query.statement(), "select * from users where id = ?");
    }

    #[test]
    fn test_plain_conditions_bind_in_call_order() {
        let query = Query::new()
            .table("users")
            .and_where("a", "=", 1)
            .or_where("b", "<", 2)
            .and_where("c", "like", "x%");

        let sql = query.statement();
        assert_eq!(
            sql,
            "select * from users where a = ? or b < ? and c like ?"
        );
        assert_eq!(placeholders(&sql), 3);
        assert_eq!(
            query.bindings(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Text("x%".to_string())
            ]
        );
    }

    #[test]
    fn test_nested_group_appends_bindings() {
        let a = Query::new().and_where("x", "=", 1).and_where("y", "=", 2);
        let b = Query::new().and_where("p", "=", 3).or_where("q", "=", 4);

        let composed = a.table("t").and_group(b);
        assert_eq!(
            composed.bindings(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Int(4)
            ]
        );
        assert_eq!(
            composed.statement(),
            "select * from t where x = ? and y = ? and (p = ? or q = ?)"
        );
    }

    #[test]
    fn test_group_then_plain_condition_keeps_placeholder_order() {
        let group = Query::new().and_where("p", "=", 1).or_where("q", "=", 2);
        let query = Query::new()
            .table("t")
            .or_group(group)
            .and_where("r", "=", 3);

        assert_eq!(
            query.statement(),
            "select * from t where (p = ? or q = ?) and r = ?"
        );
        assert_eq!(
            query.bindings(),
            &[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_doubly_nested_groups() {
        let inner = Query::new().and_where("c", "=", 3).or_where("d", "=", 4);
        let middle = Query::new().and_where("b", "=", 2).and_group(inner);
        let outer = Query::new()
            .table("t")
            .and_where("a", "=", 1)
            .or_group(middle)
            .and_where("e", "=", 5);

        let sql = outer.statement();
        assert_eq!(
            sql,
            "select * from t where a = ? or (b = ? and (c = ? or d = ?)) and e = ?"
        );
        assert_eq!(placeholders(&sql), outer.bindings().len());
        let ints: Vec<i64> = outer.bindings().iter().filter_map(SqlValue::as_int).collect();
        assert_eq!(ints, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_group_is_ignored() {
        let query = Query::new()
            .table("t")
            .and_where("a", "=", 1)
            .and_group(Query::new());
        assert_eq!(query.statement(), "select * from t where a = ?");
        assert_eq!(query.bindings().len(), 1);
    }

    #[test]
    fn test_order_by_accumulates() {
        let query = Query::new()
            .table("t")
            .order_by("name", "asc")
            .order_by("id", "desc");
        assert_eq!(query.statement(), "select * from t order by name asc, id desc");
    }

    #[test]
    fn test_limit_and_offset() {
        let query = Query::new().table("t").limit(5).offset(10);
        assert!(query.statement().contains("limit 5 offset 10"));
    }

    #[test]
    fn test_offset_without_limit_is_dropped() {
        let sql = Query::new().table("t").offset(10).statement();
        assert!(!sql.contains("limit"));
        assert!(!sql.contains("offset"));
    }

    #[test]
    fn test_clause_order() {
        let query = Query::new()
            .table("t")
            .offset(2)
            .limit(3)
            .order_by("id", "asc")
            .and_where("a", "=", 1)
            .select(["a"]);
        assert_eq!(
            query.statement(),
            "select a from t where a = ? order by id asc limit 3 offset 2"
        );
    }

    #[test]
    fn test_set_bindings_precede_where_bindings() {
        let values = Record::new().with("x", 1).with("y", 2);
        let query = Query::new().table("t").set(values).and_where("id", "=", 5);

        assert_eq!(
            query.bindings(),
            &[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(5)]
        );
        assert_eq!(query.update_statement(), "update t set x = ?, y = ? where id = ?");
    }

    #[test]
    fn test_set_after_where_is_still_first() {
        let query = Query::new()
            .table("t")
            .and_where("id", "=", 5)
            .set(Record::new().with("x", 1))
            .set(Record::new().with("y", 2));

        assert_eq!(
            query.bindings(),
            &[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(5)]
        );
        assert_eq!(query.condition_bindings(), &[SqlValue::Int(5)]);
    }

    #[test]
    fn test_select_parts_leave_out_set_bindings() {
        let (sql, bindings) = Query::new()
            .table("t")
            .set(Record::new().with("x", 1))
            .and_where("id", "=", 5)
            .into_parts();

        assert_eq!(sql, "select * from t where id = ?");
        assert_eq!(placeholders(&sql), bindings.len());
        assert_eq!(bindings, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_repeated_set_column_replaces_value_in_place() {
        let query = Query::new()
            .table("t")
            .set(Record::new().with("x", 1).with("y", 2))
            .and_where("id", "=", 5)
            .set(Record::new().with("x", 3));

        let sql = query.update_statement();
        assert_eq!(sql, "update t set x = ?, y = ? where id = ?");
        assert_eq!(placeholders(&sql), query.bindings().len());
        assert_eq!(
            query.bindings(),
            &[SqlValue::Int(3), SqlValue::Int(2), SqlValue::Int(5)]
        );
    }

    #[test]
    fn test_group_ignores_sub_set_bindings() {
        let sub = Query::new()
            .set(Record::new().with("ignored", 9))
            .and_where("a", "=", 1);
        let query = Query::new().table("t").and_group(sub);
        assert_eq!(query.bindings(), &[SqlValue::Int(1)]);
    }

    #[test]
    fn test_insert_statement() {
        let values = Record::new().with("name", "x").with("qty", 3);
        let (sql, bindings) = Query::new().table("items").insert_statement(&values);
        assert_eq!(sql, "insert into items (name, qty) values (?, ?)");
        assert_eq!(
            bindings,
            vec![SqlValue::Text("x".to_string()), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_update_without_where() {
        let query = Query::new().table("t").set(Record::new().with("a", 1));
        assert_eq!(query.update_statement(), "update t set a = ?");
    }
}
