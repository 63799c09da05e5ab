//! Single-shot SQL execution against a SQLite file.
//!
//! Every outcome is a value: database errors become
//! [`ExecutionResult::Failure`] and are never returned as `Err`. There is no
//! retry and no caching; retries belong to the caller (see
//! [`crate::repair::RepairSession`]).

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use sqlx::sqlite::SqliteConnection;
use sqlx::{Column as SqlxColumn, Statement};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::db::sqlite::{close_connection, convert_row, open_connection};
use crate::db::Record;
use crate::error::Result;
use crate::query::errors::{categorize, ErrorDetails, ErrorKind};
use crate::query::statements::count_statements;

/// Message reported when a query holds more than one statement.
pub const MULTIPLE_STATEMENTS_MESSAGE: &str = "You can only execute one statement at a time.";

/// Statement class, decided from the leading keyword only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// Leading keyword is `SELECT`; rows are fetched.
    Select,
    /// Anything else; executed and committed, rows affected reported.
    Other,
}

impl QueryType {
    /// Classifies a query by its first whitespace-separated word.
    ///
    /// Returns `None` for an empty or whitespace-only query.
    pub fn classify(query: &str) -> Option<Self> {
        query.split_whitespace().next().map(|keyword| {
            if keyword.eq_ignore_ascii_case("SELECT") {
                Self::Select
            } else {
                Self::Other
            }
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Other => "OTHER",
        }
    }
}

/// Result of executing a query.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// The statement ran to completion.
    Success(ExecutionSuccess),
    /// The statement (or the connection) failed.
    Failure(ExecutionFailure),
}

/// Successful execution outcome.
#[derive(Debug, Clone)]
pub struct ExecutionSuccess {
    /// The query as submitted.
    pub query: String,
    pub query_type: QueryType,
    /// Rows returned for SELECT, rows affected otherwise.
    pub row_count: u64,
    /// Result column names in projection order; empty for non-SELECT.
    pub columns: Vec<String>,
    /// Result rows; each has exactly `columns.len()` entries.
    pub rows: Vec<Record>,
    /// Wall time from connection open to close.
    pub execution_time: Duration,
}

/// Failed execution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    /// The query as submitted.
    pub query: String,
    pub error_type: ErrorKind,
    /// Engine message, verbatim.
    pub error_message: String,
    /// SQLite extended result code.
    pub error_code: Option<i32>,
    /// Symbolic name of `error_code`.
    pub error_name: Option<String>,
}

impl ExecutionSuccess {
    /// Rows affected by a non-SELECT statement (same counter as `row_count`).
    pub fn rows_affected(&self) -> u64 {
        self.row_count
    }

    /// Human-readable summary of the outcome.
    pub fn message(&self) -> String {
        match self.query_type {
            QueryType::Select => format!("Query returned {} row(s).", self.row_count),
            QueryType::Other => format!(
                "Query executed successfully. {} row(s) affected.",
                self.row_count
            ),
        }
    }
}

impl ExecutionFailure {
    /// Creates a failure without engine code information.
    pub fn new(query: impl Into<String>, error_type: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            error_type,
            error_message: message.into(),
            error_code: None,
            error_name: None,
        }
    }

    fn from_details(query: &str, details: ErrorDetails) -> Self {
        Self {
            query: query.to_string(),
            error_type: details.kind,
            error_message: details.message,
            error_code: details.code,
            error_name: details.name,
        }
    }
}

impl ExecutionResult {
    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success payload, if any.
    pub fn as_success(&self) -> Option<&ExecutionSuccess> {
        match self {
            Self::Success(success) => Some(success),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure payload, if any.
    pub fn as_failure(&self) -> Option<&ExecutionFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// The query this result belongs to.
    pub fn query(&self) -> &str {
        match self {
            Self::Success(success) => &success.query,
            Self::Failure(failure) => &failure.query,
        }
    }
}

/// JSON payload shapes handed to tool consumers.
#[derive(Serialize)]
#[serde(untagged)]
enum Payload<'a> {
    Rows {
        success: bool,
        query: &'a str,
        query_type: &'static str,
        row_count: u64,
        columns: &'a [String],
        data: &'a [Record],
    },
    Statement {
        success: bool,
        query: &'a str,
        query_type: &'static str,
        rows_affected: u64,
        message: String,
    },
    Error {
        success: bool,
        query: &'a str,
        error_type: ErrorKind,
        error_message: &'a str,
        error_code: Option<i32>,
        error_name: Option<&'a str>,
    },
}

impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let payload = match self {
            Self::Success(s) if s.query_type == QueryType::Select => Payload::Rows {
                success: true,
                query: &s.query,
                query_type: s.query_type.as_str(),
                row_count: s.row_count,
                columns: &s.columns,
                data: &s.rows,
            },
            Self::Success(s) => Payload::Statement {
                success: true,
                query: &s.query,
                query_type: s.query_type.as_str(),
                rows_affected: s.row_count,
                message: s.message(),
            },
            Self::Failure(f) => Payload::Error {
                success: false,
                query: &f.query,
                error_type: f.error_type,
                error_message: &f.error_message,
                error_code: f.error_code,
                error_name: f.error_name.as_deref(),
            },
        };
        payload.serialize(serializer)
    }
}

/// Executes SQL against one SQLite database file.
///
/// Holds only the path; each call opens a connection and closes it before
/// returning, on every path.
#[derive(Debug, Clone)]
pub struct SqlExecutor {
    database_path: PathBuf,
}

impl SqlExecutor {
    /// Creates an executor for the database at `database_path`.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    /// Creates an executor from the database section of the configuration.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(config.require_path()?))
    }

    /// Returns the database file path.
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Executes one SQL statement and normalizes the outcome.
    ///
    /// Input holding more than one statement is rejected before the database
    /// is opened, so none of it runs.
    pub async fn execute(&self, query: &str) -> ExecutionResult {
        let Some(query_type) = QueryType::classify(query) else {
            return ExecutionResult::Failure(ExecutionFailure::new(
                query,
                ErrorKind::Syntax,
                "Query is empty.",
            ));
        };

        if count_statements(query).is_some_and(|n| n > 1) {
            debug!("Rejecting multi-statement query: {}", query);
            return ExecutionResult::Failure(ExecutionFailure::new(
                query,
                ErrorKind::Syntax,
                MULTIPLE_STATEMENTS_MESSAGE,
            ));
        }

        if !self.database_path.exists() {
            return ExecutionResult::Failure(ExecutionFailure::new(
                query,
                ErrorKind::Connection,
                format!(
                    "Database file '{}' does not exist.",
                    self.database_path.display()
                ),
            ));
        }

        debug!("Executing {} query: {}", query_type.as_str(), query);
        let start = Instant::now();

        let mut conn = match open_connection(&self.database_path).await {
            Ok(conn) => conn,
            Err(e) => {
                let mut details = categorize(&e);
                details.kind = ErrorKind::Connection;
                warn!("Failed to open {}: {}", self.database_path.display(), e);
                return ExecutionResult::Failure(ExecutionFailure::from_details(query, details));
            }
        };

        let outcome = match query_type {
            QueryType::Select => run_select(&mut conn, query).await,
            QueryType::Other => run_statement(&mut conn, query)
                .await
                .map(|affected| (Vec::new(), Vec::new(), affected)),
        };
        close_connection(conn).await;

        match outcome {
            Ok((columns, rows, row_count)) => {
                let execution_time = start.elapsed();
                debug!("Query succeeded: {} row(s) in {:?}", row_count, execution_time);
                ExecutionResult::Success(ExecutionSuccess {
                    query: query.to_string(),
                    query_type,
                    row_count,
                    columns,
                    rows,
                    execution_time,
                })
            }
            Err(e) => {
                let details = categorize(&e);
                warn!("Query failed ({}): {}", details.kind, details.message);
                ExecutionResult::Failure(ExecutionFailure::from_details(query, details))
            }
        }
    }
}

/// Runs a SELECT, materializing columns from statement metadata so that an
/// empty result still reports its projection.
async fn run_select(
    conn: &mut SqliteConnection,
    query: &str,
) -> std::result::Result<(Vec<String>, Vec<Record>, u64), sqlx::Error> {
    let statement = sqlx::Executor::prepare(&mut *conn, query).await?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();

    let rows = sqlx::query(query).fetch_all(&mut *conn).await?;
    let records: Vec<Record> = rows.iter().map(convert_row).collect();
    let row_count = records.len() as u64;

    Ok((columns, records, row_count))
}

/// Runs a non-SELECT statement. Outside an explicit transaction SQLite
/// commits it on completion.
async fn run_statement(
    conn: &mut SqliteConnection,
    query: &str,
) -> std::result::Result<u64, sqlx::Error> {
    let result = sqlx::query(query).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Executes `query` against the database at `database_path`.
pub async fn execute(database_path: &Path, query: &str) -> ExecutionResult {
    SqlExecutor::new(database_path).execute(query).await
}
