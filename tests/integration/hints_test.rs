//! End-to-end repair hint tests: a real failure, a real index.

use pretty_assertions::assert_eq;
use sqlmend::config::SearchConfig;
use sqlmend::query::SqlExecutor;
use sqlmend::repair::{extract_hints, HintExtractor, HintKind, RepairHint};
use sqlmend::search::{SchemaDocument, StaticSearch};
use tempfile::tempdir;

use super::school_index;

#[tokio::test]
async fn test_misspelled_column_hint() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let result = executor.execute("SELECT s.first_nam FROM Students s").await;
    assert!(!result.is_success());

    let hints = extract_hints(&result, &index, config.search.hint_k).await;
    assert_eq!(
        hints,
        vec![RepairHint {
            kind: HintKind::Column,
            search_token: "first_nam".to_string(),
            source_table: "students".to_string(),
            candidates: vec!["- first_name (VARCHAR(80))".to_string()],
        }]
    );
}

#[tokio::test]
async fn test_partial_table_name_hint() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let result = executor.execute("SELECT * FROM Student").await;
    let hints = extract_hints(&result, &index, config.search.hint_k).await;

    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].kind, HintKind::Table);
    assert_eq!(hints[0].candidates, vec!["Table: students"]);
}

#[tokio::test]
async fn test_transposed_table_name_has_no_hint() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let result = executor.execute("SELECT * FROM studnet").await;
    assert!(result.as_failure().unwrap().error_message.contains("studnet"));

    let search = StaticSearch::new(vec![SchemaDocument::schema("Table: student", "student")]);
    assert!(extract_hints(&result, &search, 3).await.is_empty());
    assert!(extract_hints(&result, &index, 3).await.is_empty());
}

#[tokio::test]
async fn test_where_value_hint() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let result = executor
        .execute("SELECT * FROM Degree_Programs WHERE degree_summary_name = 'Masters' LIMIT")
        .await;
    let failure = result.as_failure().unwrap();
    assert!(!failure.error_message.contains("no such"));

    let hints = extract_hints(&result, &index, config.search.hint_k).await;
    let value = hints
        .iter()
        .find(|h| h.kind == HintKind::Value)
        .expect("expected a value hint");
    assert_eq!(value.search_token, "degree_summary_name");
    assert_eq!(value.source_table, "degree_programs");
    assert_eq!(value.candidates, vec!["Bachelor", "Master", "PHD"]);
}

#[tokio::test]
async fn test_successful_query_has_no_hints() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let result = executor.execute("SELECT first_name FROM Students").await;
    assert!(result.is_success());
    assert!(extract_hints(&result, &index, 3).await.is_empty());
}

#[tokio::test]
async fn test_report_json() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let result = executor.execute("SELECT line_2 FROM Addresses").await;
    let extractor = HintExtractor::new(&index, &SearchConfig::default());
    let report = extractor.report(result.as_failure().unwrap()).await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["error_type"], "SchemaError");
    assert_eq!(json["error_message"], "no such column: line_2");
    assert_eq!(json["query"], "SELECT line_2 FROM Addresses");
    assert_eq!(json["search_targets"][0]["kind"], "column");
    assert_eq!(json["search_targets"][0]["token"], "line_2");
    assert!(json["hints"].as_array().unwrap().is_empty());
}
