//! Bounded execute-and-repair loop.
//!
//! The session does not rewrite SQL. It executes what the caller proposes,
//! and on failure hands back the hints and the stage the next correction
//! should focus on, until the attempt budget runs out.

use serde::Serialize;
use tracing::{debug, info};

use super::{HintExtractor, RepairHint};
use crate::config::RepairConfig;
use crate::query::{ExecutionFailure, ExecutionResult, ExecutionSuccess, SqlExecutor};

/// Message for the end user once every repair attempt has failed.
pub const FALLBACK_MESSAGE: &str = "I apologize, but I wasn't able to retrieve the information you requested. The query encountered some technical issues that I couldn't automatically resolve. Could you please rephrase your question or provide more details about what specific information you're looking for?";

/// Focus of a repair attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStage {
    /// Replace misspelled tables and columns with indexed names.
    SchemaCorrection,
    /// Fix aliases, qualifiers and clause order.
    SyntaxAndLogic,
    /// Simplify or restructure the query.
    Restructuring,
}

impl RepairStage {
    /// Stage for the 1-based repair attempt number.
    pub fn for_attempt(attempt: u32) -> Self {
        match attempt {
            0 | 1 => Self::SchemaCorrection,
            2 => Self::SyntaxAndLogic,
            _ => Self::Restructuring,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SchemaCorrection => "schema correction",
            Self::SyntaxAndLogic => "syntax and logic fixes",
            Self::Restructuring => "query restructuring",
        }
    }
}

/// What the caller should do after an attempt.
#[derive(Debug, Clone)]
pub enum RepairDecision {
    /// The query ran; nothing left to repair.
    Done(ExecutionSuccess),
    /// The query failed; propose a corrected query and call again.
    Retry {
        /// 1-based number of the repair attempt being requested.
        attempt: u32,
        stage: RepairStage,
        failure: ExecutionFailure,
        hints: Vec<RepairHint>,
    },
    /// The budget is spent.
    GiveUp { message: String },
}

/// Tracks executions for one user request.
#[derive(Debug, Clone)]
pub struct RepairSession {
    max_attempts: u32,
    executions: u32,
}

impl RepairSession {
    /// Creates a session allowing `max_attempts` repairs after the first run.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            executions: 0,
        }
    }

    pub fn from_config(config: &RepairConfig) -> Self {
        Self::new(config.max_attempts)
    }

    /// Number of executions performed so far.
    pub fn executions(&self) -> u32 {
        self.executions
    }

    /// Returns true once no further execution is allowed.
    pub fn is_exhausted(&self) -> bool {
        self.executions > self.max_attempts
    }

    /// Executes `query` and decides the next step.
    pub async fn attempt(
        &mut self,
        executor: &SqlExecutor,
        extractor: &HintExtractor<'_>,
        query: &str,
    ) -> RepairDecision {
        if self.is_exhausted() {
            debug!("Repair budget spent, not executing");
            return give_up();
        }

        self.executions += 1;
        let query = normalize_query_text(query);
        let result = executor.execute(&query).await;

        let failure = match result {
            ExecutionResult::Success(success) => {
                debug!("Execution {} succeeded", self.executions);
                return RepairDecision::Done(success);
            }
            ExecutionResult::Failure(failure) => failure,
        };

        let attempt = self.executions;
        if attempt > self.max_attempts {
            info!(
                "Giving up after {} execution(s): {}",
                self.executions, failure.error_message
            );
            return give_up();
        }

        let stage = RepairStage::for_attempt(attempt);
        let hints = extractor.report(&failure).await.hints;
        info!(
            "Repair attempt {}/{} ({}): {} hint(s) for {}",
            attempt,
            self.max_attempts,
            stage.description(),
            hints.len(),
            failure.error_type
        );

        RepairDecision::Retry {
            attempt,
            stage,
            failure,
            hints,
        }
    }
}

fn give_up() -> RepairDecision {
    RepairDecision::GiveUp {
        message: FALLBACK_MESSAGE.to_string(),
    }
}

/// Collapses all whitespace, including newlines, into single spaces.
pub fn normalize_query_text(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
