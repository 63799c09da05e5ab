//! sqlmend - SQL execution with schema-aware repair hints for SQLite.
//!
//! This library exposes the core modules for use in integration tests and
//! the `sqlmend` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod repair;
pub mod search;
