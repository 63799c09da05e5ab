//! Command-line argument parsing for sqlmend.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sqlmend::config::Config;

/// SQL execution with schema-aware repair hints for SQLite.
#[derive(Parser, Debug)]
#[command(name = "sqlmend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides config and DB_PATH)
    #[arg(short = 'd', long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Index store directory (overrides config and STORE_DIR)
    #[arg(short = 's', long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the database from its schema script and build the index
    Build {
        /// SQL script to create the database from (overrides config and SCHEMA_PATH)
        #[arg(long, value_name = "PATH")]
        schema: Option<PathBuf>,

        /// Rebuild even if an index already exists
        #[arg(long)]
        rebuild: bool,
    },

    /// Execute a query and print the result as JSON
    Exec {
        #[arg(value_name = "SQL")]
        query: String,
    },

    /// Execute a query and print repair hints if it fails
    Hints {
        #[arg(value_name = "SQL")]
        query: String,
    },

    /// Print schema context for a natural-language question
    Context {
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Number of documents to retrieve
        #[arg(short, value_name = "N")]
        k: Option<usize>,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies CLI overrides on top of file and environment settings.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database.path = Some(path.clone());
        }
        if let Some(dir) = &self.store {
            config.store.dir = Some(dir.clone());
        }
        if let Command::Build {
            schema: Some(script),
            ..
        } = &self.command
        {
            config.database.schema_script = Some(script.clone());
        }
        if let Command::Context { k: Some(k), .. } = &self.command {
            config.search.context_k = *k;
        }
    }
}
