//! Configuration management for sqlmend.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The resulting [`Config`] is passed explicitly into the executor, the hint
//! extractor and the index builder; nothing reads process globals after load.

use crate::error::{Result, SqlmendError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for sqlmend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional log file; logs go to stderr when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// SQLite database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Similarity index storage.
    #[serde(default)]
    pub store: StoreConfig,

    /// Similarity search tuning.
    #[serde(default)]
    pub search: SearchConfig,

    /// Repair loop policy.
    #[serde(default)]
    pub repair: RepairConfig,
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: Option<PathBuf>,

    /// SQL script used to (re)create the database.
    pub schema_script: Option<PathBuf>,
}

/// Similarity index storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Directory holding the persisted index.
    pub dir: Option<PathBuf>,
}

/// Similarity search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Documents requested per repair-hint lookup.
    #[serde(default = "default_hint_k")]
    pub hint_k: usize,

    /// Documents requested per schema-context lookup.
    #[serde(default = "default_context_k")]
    pub context_k: usize,
}

fn default_hint_k() -> usize {
    3
}

fn default_context_k() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hint_k: default_hint_k(),
            context_k: default_context_k(),
        }
    }
}

/// Repair loop policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Repair attempts allowed after the first execution fails.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl DatabaseConfig {
    /// Returns the configured database path or a configuration error.
    pub fn require_path(&self) -> Result<&Path> {
        self.path.as_deref().ok_or_else(|| {
            SqlmendError::config("database.path is not set (use --database or DB_PATH)")
        })
    }
}

impl StoreConfig {
    /// Returns the configured store directory or a configuration error.
    pub fn require_dir(&self) -> Result<&Path> {
        self.dir.as_deref().ok_or_else(|| {
            SqlmendError::config("store.dir is not set (use --store or STORE_DIR)")
        })
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlmend")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error; defaults are returned instead.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SqlmendError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SqlmendError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variables (DB_PATH, SCHEMA_PATH, STORE_DIR) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|key| std::env::var(key).ok());
    }

    fn apply_defaults_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.database.path.is_none() {
            self.database.path = lookup("DB_PATH").map(PathBuf::from);
        }
        if self.database.schema_script.is_none() {
            self.database.schema_script = lookup("SCHEMA_PATH").map(PathBuf::from);
        }
        if self.store.dir.is_none() {
            self.store.dir = lookup("STORE_DIR").map(PathBuf::from);
        }
    }

    /// Validates values that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.search.hint_k == 0 || self.search.context_k == 0 {
            return Err(SqlmendError::config("search.hint_k and search.context_k must be > 0"));
        }
        Ok(())
    }
}
