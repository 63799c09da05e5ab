//! Error types for sqlmend.
//!
//! Defines the error enum used by the ambient operations (configuration,
//! bootstrap, index persistence). Query execution never returns these: its
//! failures are values, see [`crate::query::ExecutionResult`].

use thiserror::Error;

/// Main error type for sqlmend operations.
#[derive(Error, Debug)]
pub enum SqlmendError {
    /// Database connection errors (missing file, cannot open, not a database).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Errors from statements the crate issues itself (introspection, bootstrap).
    #[error("Query error: {0}")]
    Query(String),

    /// Similarity search errors (index missing, lookup failed).
    #[error("Search error: {0}")]
    Search(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors while reading scripts or persisting the index.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal errors (unexpected states, serialization bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SqlmendError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a search error with the given message.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Search(_) => "Search Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SqlmendError.
pub type Result<T> = std::result::Result<T, SqlmendError>;
