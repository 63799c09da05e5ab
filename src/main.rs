//! sqlmend - SQL execution with schema-aware repair hints for SQLite.

mod cli;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info};

use cli::{Cli, Command};
use sqlmend::config::Config;
use sqlmend::error::SqlmendError;
use sqlmend::logging;
use sqlmend::query::{ExecutionResult, SqlExecutor};
use sqlmend::repair::HintExtractor;
use sqlmend::search::{open_or_build, schema_context, SchemaIndex};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e:#}", category(&e));
            std::process::exit(1);
        }
    };

    logging::init(config.log_file.as_deref(), cli.verbose);
    let logs_to_file = config.log_file.is_some();

    if let Err(e) = run(cli.command, config).await {
        error!("{}: {:#}", category(&e), e);
        if logs_to_file {
            eprintln!("{}: {e:#}", category(&e));
        }
        std::process::exit(1);
    }
}

/// Loads configuration with precedence: CLI flags, config file, environment.
fn load_config(cli: &Cli) -> Result<Config> {
    let config_path = cli.config_path();
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_defaults();
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Build { rebuild, .. } => {
            let index = open_or_build(&config, rebuild).await?;
            info!("Index holds {} documents", index.len());
            println!("Indexed {} documents.", index.len());
        }
        Command::Exec { query } => {
            let executor = SqlExecutor::from_config(&config.database)?;
            let result = executor.execute(&query).await;
            print_json(&result)?;
        }
        Command::Hints { query } => {
            let executor = SqlExecutor::from_config(&config.database)?;
            match executor.execute(&query).await {
                ExecutionResult::Failure(failure) => {
                    let index = load_index(&config)?;
                    let extractor = HintExtractor::new(&index, &config.search);
                    let report = extractor.report(&failure).await;
                    print_json(&report)?;
                }
                success => print_json(&success)?,
            }
        }
        Command::Context { question, .. } => {
            let index = load_index(&config)?;
            let context = schema_context(&index, &question, config.search.context_k).await?;
            println!("{context}");
        }
    }
    Ok(())
}

fn load_index(config: &Config) -> Result<SchemaIndex> {
    let dir = config.store.require_dir()?;
    SchemaIndex::load(dir).context("No usable index found; run `sqlmend build` first")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn category(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<SqlmendError>()
        .map(SqlmendError::category)
        .unwrap_or("Error")
}
