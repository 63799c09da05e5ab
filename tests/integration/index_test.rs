//! Database bootstrap, introspection and index lifecycle tests.

use pretty_assertions::assert_eq;
use sqlmend::db::introspect;
use sqlmend::query::SqlExecutor;
use sqlmend::search::index::INDEX_FILE;
use sqlmend::search::{open_or_build, schema_context, SchemaContext, SchemaIndex};
use tempfile::tempdir;

use super::{school_db, school_index, test_config};

#[tokio::test]
async fn test_introspect_fixture() {
    let dir = tempdir().unwrap();
    let schema = introspect(&school_db(&dir).await).await.unwrap();

    let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Addresses", "Students", "Degree_Programs"]);

    let students = schema.table("Students").unwrap();
    assert_eq!(students.columns.len(), 4);
    assert_eq!(students.primary_key, vec!["student_id"]);
    assert_eq!(students.sample_rows.len(), 3);

    assert_eq!(schema.foreign_keys.len(), 1);
    assert_eq!(schema.foreign_keys[0].to_table, "Addresses");
}

#[tokio::test]
async fn test_documents_render_schema() {
    let dir = tempdir().unwrap();
    let schema = introspect(&school_db(&dir).await).await.unwrap();
    let docs = schema.to_documents();

    let students = docs
        .iter()
        .find(|d| d.table_name() == "Students")
        .unwrap();
    assert!(students.content.starts_with("Table: Students\n\nColumns:\n"));
    assert!(students.content.contains("- first_name (VARCHAR(80))"));
    assert!(students
        .content
        .contains("- current_address_id references Addresses(address_id)"));
    assert!(students
        .content
        .contains("student_id | current_address_id | first_name | last_name"));
    assert!(students.content.contains("1 | 1 | Timmothy | Ward"));
}

#[tokio::test]
async fn test_build_persists_index() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;

    assert_eq!(index.len(), 5);
    let store = config.store.dir.as_deref().unwrap();
    assert!(store.join(INDEX_FILE).is_file());
    assert!(config.database.path.as_deref().unwrap().is_file());

    let loaded = SchemaIndex::load(store).unwrap();
    assert_eq!(loaded.len(), index.len());
    assert!(loaded.documents().eq(index.documents()));
    assert!(loaded
        .documents()
        .any(|d| d.table_name() == "Degree_Programs"));
}

#[tokio::test]
async fn test_existing_index_is_reused() {
    let dir = tempdir().unwrap();
    let (config, _) = school_index(&dir).await;

    std::fs::remove_file(config.database.path.as_deref().unwrap()).unwrap();
    let reused = open_or_build(&config, false).await.unwrap();

    assert_eq!(reused.len(), 5);
    assert!(!config.database.path.as_deref().unwrap().exists());
}

#[tokio::test]
async fn test_rebuild_recreates_database() {
    let dir = tempdir().unwrap();
    let (config, _) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();

    let deleted = executor.execute("DELETE FROM Students").await;
    assert_eq!(deleted.as_success().unwrap().rows_affected(), 4);

    open_or_build(&config, true).await.unwrap();
    let count = executor.execute("SELECT * FROM Students").await;
    assert_eq!(count.as_success().unwrap().row_count, 4);
}

#[tokio::test]
async fn test_build_without_database_fails() {
    let dir = tempdir().unwrap();
    let mut config = test_config(&dir);
    config.database.schema_script = None;

    let err = open_or_build(&config, true).await.unwrap_err();
    assert_eq!(err.category(), "Connection Error");
}

#[tokio::test]
async fn test_schema_context_against_index() {
    let dir = tempdir().unwrap();
    let (_, index) = school_index(&dir).await;

    let context = schema_context(&index, "What are the addresses and their cities?", 10)
        .await
        .unwrap();
    let SchemaContext::Snippets(snippets) = context else {
        panic!("expected snippets");
    };

    let addresses = snippets.iter().find(|s| s.table == "Addresses").unwrap();
    assert!(addresses.lines.iter().any(|l| l == "- city (VARCHAR(255))"));
    assert!(addresses.lines.iter().any(|l| l == "Table: Addresses"));
}
