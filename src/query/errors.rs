//! Classification of database-layer errors into execution failure categories.

use serde::{Serialize, Serializer};
use sqlx::error::ErrorKind as SqlxErrorKind;
use std::fmt;

/// Category of an execution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Store unreachable: missing file, cannot open, not a database.
    Connection,
    /// The engine could not parse the statement.
    Syntax,
    /// Unknown table, column or function.
    Schema,
    /// Bad literal, comparison, argument count or datatype.
    TypeOrValue,
    /// UNIQUE / NOT NULL / FOREIGN KEY / CHECK violation.
    Constraint,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Returns the taxonomy name reported as `error_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "ConnectionError",
            Self::Syntax => "SyntaxError",
            Self::Schema => "SchemaError",
            Self::TypeOrValue => "TypeOrValueError",
            Self::Constraint => "ConstraintError",
            Self::Unknown => "UnknownError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Categorized view of a database error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub kind: ErrorKind,
    /// Engine message, verbatim.
    pub message: String,
    /// SQLite extended result code, when the engine reported one.
    pub code: Option<i32>,
    /// Symbolic name of `code` (e.g. `SQLITE_CONSTRAINT_UNIQUE`).
    pub name: Option<String>,
}

/// Categorizes a sqlx error.
pub fn categorize(err: &sqlx::Error) -> ErrorDetails {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            let code = db_err.code().and_then(|c| c.parse::<i32>().ok());
            let kind = match db_err.kind() {
                SqlxErrorKind::UniqueViolation
                | SqlxErrorKind::ForeignKeyViolation
                | SqlxErrorKind::NotNullViolation
                | SqlxErrorKind::CheckViolation => ErrorKind::Constraint,
                _ => classify_engine_error(code, &message),
            };
            ErrorDetails {
                kind,
                message,
                code,
                name: code.and_then(sqlite_code_name).map(str::to_string),
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => simple(ErrorKind::Connection, err),
        sqlx::Error::ColumnNotFound(_) => simple(ErrorKind::Schema, err),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::TypeNotFound { .. } => {
            simple(ErrorKind::TypeOrValue, err)
        }
        _ => simple(ErrorKind::Unknown, err),
    }
}

fn simple(kind: ErrorKind, err: &sqlx::Error) -> ErrorDetails {
    ErrorDetails {
        kind,
        message: err.to_string(),
        code: None,
        name: None,
    }
}

/// Classifies an engine error by its primary result code, then by message.
pub fn classify_engine_error(code: Option<i32>, message: &str) -> ErrorKind {
    match code.map(|c| c & 0xff) {
        Some(14) | Some(26) => return ErrorKind::Connection, // CANTOPEN, NOTADB
        Some(19) => return ErrorKind::Constraint,
        Some(20) | Some(25) => return ErrorKind::TypeOrValue, // MISMATCH, RANGE
        _ => {}
    }

    let msg = message.to_lowercase();
    if msg.contains("syntax error")
        || msg.contains("incomplete input")
        || msg.contains("unrecognized token")
    {
        ErrorKind::Syntax
    } else if msg.contains("no such table")
        || msg.contains("no such column")
        || msg.contains("no such function")
        || msg.contains("has no column named")
        || msg.contains("ambiguous column name")
        || msg.contains("already exists")
    {
        ErrorKind::Schema
    } else if msg.contains("mismatch")
        || msg.contains("wrong number of arguments")
        || msg.contains("values were supplied")
        || msg.contains("misuse of aggregate")
        || msg.contains("out of range")
    {
        ErrorKind::TypeOrValue
    } else if msg.contains("unable to open database") || msg.contains("not a database") {
        ErrorKind::Connection
    } else {
        ErrorKind::Unknown
    }
}

/// Returns the symbolic name for a SQLite (extended) result code.
pub fn sqlite_code_name(code: i32) -> Option<&'static str> {
    let name = match code {
        275 => "SQLITE_CONSTRAINT_CHECK",
        787 => "SQLITE_CONSTRAINT_FOREIGNKEY",
        1299 => "SQLITE_CONSTRAINT_NOTNULL",
        1555 => "SQLITE_CONSTRAINT_PRIMARYKEY",
        2067 => "SQLITE_CONSTRAINT_UNIQUE",
        _ => match code & 0xff {
            1 => "SQLITE_ERROR",
            2 => "SQLITE_INTERNAL",
            3 => "SQLITE_PERM",
            4 => "SQLITE_ABORT",
            5 => "SQLITE_BUSY",
            6 => "SQLITE_LOCKED",
            7 => "SQLITE_NOMEM",
            8 => "SQLITE_READONLY",
            9 => "SQLITE_INTERRUPT",
            10 => "SQLITE_IOERR",
            11 => "SQLITE_CORRUPT",
            13 => "SQLITE_FULL",
            14 => "SQLITE_CANTOPEN",
            18 => "SQLITE_TOOBIG",
            19 => "SQLITE_CONSTRAINT",
            20 => "SQLITE_MISMATCH",
            21 => "SQLITE_MISUSE",
            23 => "SQLITE_AUTH",
            25 => "SQLITE_RANGE",
            26 => "SQLITE_NOTADB",
            _ => return None,
        },
    };
    Some(name)
}
