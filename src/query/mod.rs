//! Query execution and error classification for sqlmend.
//!
//! This module isolates SQL execution and the normalization of its outcome
//! into a tagged result value.

pub mod errors;
pub mod executor;
pub mod statements;

pub use errors::{ErrorDetails, ErrorKind};
pub use executor::{
    execute, ExecutionFailure, ExecutionResult, ExecutionSuccess, QueryType, SqlExecutor,
    MULTIPLE_STATEMENTS_MESSAGE,
};
