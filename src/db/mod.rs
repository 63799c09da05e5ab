//! Database layer for sqlmend.
//!
//! SQLite is the only backend: one database file, dynamically typed columns,
//! a fresh connection per operation.

mod schema;
pub mod sqlite;
mod types;

pub use schema::{Column, ForeignKey, Schema, Table, SAMPLE_ROW_LIMIT};
pub use sqlite::{build_database, introspect};
pub use types::{Record, Value};
