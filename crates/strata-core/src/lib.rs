//! # strata-core
//!
//! Shared building blocks for the strata schema migrator and model layer.
//!
//! This crate provides:
//! - Defaulted, read-only definitions of a JSON schema document
//!   ([`Schema`], [`Table`], [`Column`])
//! - A fluent builder for parameterized statements ([`Query`]) whose
//!   placeholders always line up with their bindings
//! - The [`Connection`] trait every database driver implements, plus an
//!   in-memory [`ScriptedConnection`]
//!
//! ## Loading a schema
//!
//! ```rust
//! use strata_core::Schema;
//!
//! let schema = Schema::from_json_str(r#"{
//!     "connection": {"database": "shop"},
//!     "tables": {"items": {"columns": {"price": {"type": "currency"}}}}
//! }"#).unwrap();
//!
//! let items = schema.get_table("items").unwrap();
//! assert_eq!(items.physical_name(), "items");
//! assert_eq!(items.get_column("price").unwrap().sql_type(), "decimal");
//! ```
//!
//! ## Building a query
//!
//! ```rust
//! use strata_core::Query;
//!
//! let (sql, params) = Query::new()
//!     .table("users")
//!     .and_where("name", "=", "'; DROP TABLE users; --")
//!     .into_parts();
//!
//! assert_eq!(sql, "select * from users where name = ?");
//! assert_eq!(params.len(), 1);
//! ```

pub mod connection;
pub mod definition;
mod error;
pub mod query;
pub mod value;

pub use connection::{Connection, ExecutedStatement, ScriptedConnection};
pub use definition::{fill_defaults, Column, Definition, Schema, Table};
pub use error::{Result, StrataError};
pub use query::Query;
pub use value::{Record, SqlValue, ToSqlValue};
