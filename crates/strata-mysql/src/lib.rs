//! # strata-mysql
//!
//! The MySQL implementation of [`strata_core::Connection`].
//!
//! Settings are resolved once from the environment and the schema
//! document; every statement then runs on its own short-lived sqlx
//! session.
//!
//! ```rust,no_run
//! use strata_core::{Query, Schema};
//! use strata_mysql::MySqlConnection;
//!
//! # async fn run() -> strata_core::Result<()> {
//! let schema = Schema::from_path("schema.json")?;
//! let conn = MySqlConnection::from_schema(&schema);
//! let rows = Query::new().table("users").limit(10).get(&conn).await?;
//! println!("{} users", rows.len());
//! # Ok(())
//! # }
//! ```

mod connection;
mod decode;
mod settings;

pub use connection::{quote_identifier, MySqlConnection};
pub use decode::decode_row;
pub use settings::ConnectionSettings;
