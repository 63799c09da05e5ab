//! Integration tests for sqlmend.

pub mod executor_test;
pub mod hints_test;
pub mod index_test;
pub mod session_test;

use std::path::{Path, PathBuf};

use sqlmend::config::Config;
use sqlmend::search::{open_or_build, SchemaIndex};
use tempfile::TempDir;

/// Path to the shared schema script.
pub fn fixture_script() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("school.sql")
}

/// Configuration rooted in `dir`, pointing at the fixture script.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.path = Some(dir.path().join("school.sqlite"));
    config.database.schema_script = Some(fixture_script());
    config.store.dir = Some(dir.path().join("store"));
    config
}

/// Creates the fixture database and returns its path.
pub async fn school_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("school.sqlite");
    sqlmend::db::build_database(&path, &fixture_script())
        .await
        .unwrap();
    path
}

/// Creates the fixture database and its index.
pub async fn school_index(dir: &TempDir) -> (Config, SchemaIndex) {
    let config = test_config(dir);
    let index = open_or_build(&config, true).await.unwrap();
    (config, index)
}
