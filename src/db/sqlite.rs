//! SQLite access via sqlx.
//!
//! Connection acquisition, row decoding, schema introspection and database
//! bootstrap. Every function here opens its own connection and closes it
//! before returning.

use crate::db::{Column, ForeignKey, Record, Schema, Table, Value, SAMPLE_ROW_LIMIT};
use crate::error::{Result, SqlmendError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, Connection, Row as SqlxRow, TypeInfo, ValueRef};
use std::path::Path;
use tracing::{debug, info, warn};

/// Opens a single connection to an existing SQLite database file.
///
/// The file is never created here; callers check for its existence first.
/// Foreign key enforcement stays at the SQLite default (off); sqlx would
/// otherwise switch it on for every connection.
pub async fn open_connection(path: &Path) -> std::result::Result<SqliteConnection, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false)
        .foreign_keys(false);
    SqliteConnection::connect_with(&options).await
}

/// Closes a connection, logging instead of failing.
pub async fn close_connection(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close SQLite connection cleanly: {e}");
    }
}

/// Converts a sqlx SqliteRow to a [`Record`], keeping column order.
pub fn convert_row(row: &SqliteRow) -> Record {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| (col.name().to_string(), convert_value(row, i)))
        .collect()
}

/// Converts a single cell, dispatching on the cell's runtime storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "INTEGER" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .or_else(|_| row.try_get::<i64, _>(index).map(Value::Int))
            .or_else(|_| row.try_get::<f64, _>(index).map(Value::Float))
            .unwrap_or(Value::Null),
    }
}

/// Quotes an identifier for interpolation into PRAGMA and SELECT statements.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Introspects tables, columns, foreign keys and sample rows of a database.
pub async fn introspect(path: &Path) -> Result<Schema> {
    if !path.exists() {
        return Err(SqlmendError::connection(format!(
            "Database file '{}' does not exist.",
            path.display()
        )));
    }

    let mut conn = open_connection(path)
        .await
        .map_err(|e| SqlmendError::connection(format!("Failed to open {}: {e}", path.display())))?;

    let schema = fetch_schema(&mut conn).await;
    close_connection(conn).await;
    schema
}

async fn fetch_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    let table_names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
        ORDER BY rowid
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| SqlmendError::query(format!("Failed to fetch tables: {e}")))?;

    let mut schema = Schema::new();

    for table_name in table_names {
        let (columns, primary_key) = fetch_columns(conn, &table_name).await?;
        let foreign_keys = fetch_foreign_keys(conn, &table_name).await?;
        let sample_rows = fetch_sample_rows(conn, &table_name).await?;

        debug!(
            "Introspected table {} ({} columns, {} sample rows)",
            table_name,
            columns.len(),
            sample_rows.len()
        );

        schema.foreign_keys.extend(foreign_keys);
        schema.tables.push(Table {
            name: table_name,
            columns,
            primary_key,
            sample_rows,
        });
    }

    Ok(schema)
}

/// Fetches columns and primary key members for a table.
async fn fetch_columns(
    conn: &mut SqliteConnection,
    table_name: &str,
) -> Result<(Vec<Column>, Vec<String>)> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(table_name)))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            SqlmendError::query(format!("Failed to fetch columns for {table_name}: {e}"))
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    let mut pk_members: Vec<(i64, String)> = Vec::new();

    for row in &rows {
        let name: String = row.try_get("name").unwrap_or_default();
        let data_type: String = row.try_get("type").unwrap_or_default();
        let not_null: i64 = row.try_get("notnull").unwrap_or(0);
        let default: Option<String> = row.try_get("dflt_value").unwrap_or(None);
        let pk: i64 = row.try_get("pk").unwrap_or(0);

        if pk > 0 {
            pk_members.push((pk, name.clone()));
        }
        columns.push(Column {
            name,
            data_type,
            is_nullable: not_null == 0,
            default,
        });
    }

    pk_members.sort_by_key(|(position, _)| *position);
    let primary_key = pk_members.into_iter().map(|(_, name)| name).collect();

    Ok((columns, primary_key))
}

/// Fetches outgoing foreign key references for a table.
async fn fetch_foreign_keys(
    conn: &mut SqliteConnection,
    table_name: &str,
) -> Result<Vec<ForeignKey>> {
    let rows = sqlx::query(&format!(
        "PRAGMA foreign_key_list({})",
        quote_ident(table_name)
    ))
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| {
        SqlmendError::query(format!("Failed to fetch foreign keys for {table_name}: {e}"))
    })?;

    Ok(rows
        .iter()
        .map(|row| {
            ForeignKey::new(
                table_name,
                row.try_get::<String, _>("from").unwrap_or_default(),
                row.try_get::<String, _>("table").unwrap_or_default(),
                row.try_get::<Option<String>, _>("to").unwrap_or(None),
            )
        })
        .collect())
}

/// Fetches up to [`SAMPLE_ROW_LIMIT`] rows of a table.
async fn fetch_sample_rows(
    conn: &mut SqliteConnection,
    table_name: &str,
) -> Result<Vec<Vec<Value>>> {
    let rows = sqlx::query(&format!(
        "SELECT * FROM {} LIMIT {SAMPLE_ROW_LIMIT}",
        quote_ident(table_name)
    ))
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| {
        SqlmendError::query(format!("Failed to fetch sample rows for {table_name}: {e}"))
    })?;

    Ok(rows
        .iter()
        .map(|row| convert_row(row).values().cloned().collect())
        .collect())
}

/// (Re)creates a database file by running a SQL script against a fresh file.
///
/// An existing file at `db_path` is deleted first.
pub async fn build_database(db_path: &Path, script_path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(script_path).map_err(|e| {
        SqlmendError::io(format!(
            "Failed to read schema script {}: {e}",
            script_path.display()
        ))
    })?;

    if db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            SqlmendError::io(format!("Failed to remove {}: {e}", db_path.display()))
        })?;
    }
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            SqlmendError::io(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }

    info!("(Re)creating SQLite database at {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(false);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(|e| SqlmendError::connection(format!("Failed to create database: {e}")))?;

    let result = sqlx::raw_sql(&script)
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(|e| SqlmendError::query(format!("Schema script failed: {e}")));

    close_connection(conn).await;
    result
}
