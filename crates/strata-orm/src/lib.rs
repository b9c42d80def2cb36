//! # strata-orm
//!
//! Row models for tables declared in a strata [`Schema`](strata_core::Schema).
//!
//! This crate provides:
//! - [`Context`], the explicit handle owning the schema and the connection
//! - [`Model`], one row with typed accessors, column validation on writes
//!   and timestamp-stamping `save`
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_core::{Record, Schema, ScriptedConnection};
//! use strata_orm::Context;
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::from_json_str(
//!     r#"{"tables": {"users": {"columns": {"email": {}, "age": {"type": "integer"}}}}}"#,
//! ).unwrap();
//! let conn = ScriptedConnection::new("app").respond_when(
//!     "from users",
//!     vec![Record::new().with("id", 7).with("email", "a@example.com").with("age", 41)],
//! );
//! let ctx = Context::new(schema, conn);
//!
//! let adults = ctx
//!     .fetch("users", ctx.query("users")?.and_where("age", ">=", 18))
//!     .await?;
//! assert_eq!(adults[0].text("email"), Some("a@example.com"));
//! assert_eq!(adults[0].int("age"), Some(41));
//! # Ok::<(), strata_orm::OrmError>(())
//! # }).unwrap();
//! ```

mod context;
mod error;
mod model;

pub use context::Context;
pub use error::{OrmError, Result};
pub use model::{Model, IMPLICIT_COLUMNS};

// Re-export commonly used types from strata-core
pub use strata_core::{Record, SqlValue, ToSqlValue};
