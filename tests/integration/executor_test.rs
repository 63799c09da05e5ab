//! Query execution integration tests.

use pretty_assertions::assert_eq;
use sqlmend::db::Value;
use sqlmend::query::{
    execute, ErrorKind, QueryType, SqlExecutor, MULTIPLE_STATEMENTS_MESSAGE,
};
use tempfile::tempdir;

use super::school_db;

#[tokio::test]
async fn test_select_shape_matches_columns() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor
        .execute("SELECT student_id, first_name, last_name FROM Students ORDER BY student_id")
        .await;
    let success = result.as_success().expect("select should succeed");

    assert_eq!(success.query_type, QueryType::Select);
    assert_eq!(success.row_count, 4);
    assert_eq!(success.rows.len(), 4);
    assert_eq!(success.columns, vec!["student_id", "first_name", "last_name"]);
    for row in &success.rows {
        assert_eq!(row.keys().collect::<Vec<_>>(), success.columns);
    }
    assert_eq!(success.rows[0].get("student_id"), Some(&Value::Int(1)));
    assert_eq!(success.rows[3].get("last_name"), Some(&Value::from("Balistreri")));
}

#[tokio::test]
async fn test_duplicate_projection_keeps_every_column() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor
        .execute("SELECT first_name, first_name FROM Students LIMIT 1")
        .await;
    let success = result.as_success().unwrap();

    assert_eq!(success.columns.len(), 2);
    assert_eq!(success.rows[0].len(), 2);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["columns"], serde_json::json!(["first_name", "first_name"]));
    assert_eq!(json["data"][0]["first_name"], "Timmothy");
    assert_eq!(json["data"][0]["first_name:1"], "Timmothy");
    assert_eq!(json["data"][0].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_table_reports_name() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor.execute("SELECT * FROM Studnets").await;
    let failure = result.as_failure().expect("query should fail");

    assert_eq!(failure.error_type, ErrorKind::Schema);
    assert!(failure.error_message.contains("no such table"));
    assert!(failure.error_message.contains("Studnets"));
    assert_eq!(failure.query, "SELECT * FROM Studnets");
}

#[tokio::test]
async fn test_repeated_select_is_idempotent() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);
    let query = "SELECT * FROM Addresses ORDER BY address_id";

    let first = executor.execute(query).await;
    let second = executor.execute(query).await;

    let (first, second) = (first.as_success().unwrap(), second.as_success().unwrap());
    assert_eq!(first.columns, second.columns);
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.row_count, 3);
}

#[tokio::test]
async fn test_update_commits_and_reports_rows_affected() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor
        .execute("UPDATE Students SET last_name = 'Moved' WHERE current_address_id = 1")
        .await;
    let success = result.as_success().unwrap();
    assert_eq!(success.query_type, QueryType::Other);
    assert_eq!(success.rows_affected(), 3);
    assert!(success.message().contains('3'));

    let check = executor
        .execute("SELECT COUNT(*) AS n FROM Students WHERE last_name = 'Moved'")
        .await;
    assert_eq!(
        check.as_success().unwrap().rows[0].get("n"),
        Some(&Value::Int(3))
    );
}

#[tokio::test]
async fn test_constraint_violation() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor
        .execute("INSERT INTO Students (student_id, current_address_id) VALUES (1, 1)")
        .await;
    let failure = result.as_failure().unwrap();

    assert_eq!(failure.error_type, ErrorKind::Constraint);
    assert!(failure.error_message.contains("UNIQUE"));
}

#[tokio::test]
async fn test_missing_database_is_connection_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.sqlite");

    let result = execute(&path, "SELECT * FROM Students").await;
    let failure = result.as_failure().unwrap();

    assert_eq!(failure.error_type, ErrorKind::Connection);
    assert_eq!(
        failure.error_message,
        format!("Database file '{}' does not exist.", path.display())
    );
    assert!(!path.exists());
}

async fn student_count(executor: &SqlExecutor) -> Option<i64> {
    let result = executor.execute("SELECT COUNT(*) AS n FROM Students").await;
    result.as_success()?.rows[0].get("n")?.as_i64()
}

#[tokio::test]
async fn test_two_selects_are_rejected() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor
        .execute("SELECT first_name FROM Students; SELECT city FROM Addresses")
        .await;
    let failure = result.as_failure().expect("two statements must fail");

    assert_eq!(failure.error_type, ErrorKind::Syntax);
    assert_eq!(failure.error_message, MULTIPLE_STATEMENTS_MESSAGE);
}

#[tokio::test]
async fn test_trailing_delete_never_runs() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor.execute("SELECT 1 AS a; DELETE FROM Students").await;
    assert!(!result.is_success());
    assert_eq!(student_count(&executor).await, Some(4));

    let result = executor
        .execute("UPDATE Students SET last_name = 'x'; DROP TABLE Addresses")
        .await;
    assert!(!result.is_success());
    let names = executor
        .execute("SELECT COUNT(*) AS n FROM Students WHERE last_name = 'x'")
        .await;
    assert_eq!(
        names.as_success().unwrap().rows[0].get("n"),
        Some(&Value::Int(0))
    );
}

#[tokio::test]
async fn test_trailing_semicolon_is_one_statement() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let result = executor.execute("SELECT * FROM Students;").await;
    assert_eq!(result.as_success().unwrap().row_count, 4);
}

#[tokio::test]
async fn test_foreign_keys_are_not_enforced() {
    let dir = tempdir().unwrap();
    let executor = SqlExecutor::new(school_db(&dir).await);

    let deleted = executor
        .execute("DELETE FROM Addresses WHERE address_id = 1")
        .await;
    assert_eq!(deleted.as_success().unwrap().rows_affected(), 1);

    let orphan = executor
        .execute("INSERT INTO Students (student_id, current_address_id) VALUES (9, 99)")
        .await;
    assert_eq!(orphan.as_success().unwrap().rows_affected(), 1);
    assert_eq!(student_count(&executor).await, Some(5));
}
