//! Error classification and repair-hint extraction.
//!
//! A failed execution is mapped to at most one search target (a misspelled
//! column, a misspelled table, or a suspicious `WHERE` value). The target's
//! token is looked up in the similarity index and each returned document is
//! filtered down to the lines a caller can use to correct the query.

pub mod parse;
mod session;

pub use session::{
    normalize_query_text, RepairDecision, RepairSession, RepairStage, FALLBACK_MESSAGE,
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::query::{ErrorKind, ExecutionFailure, ExecutionResult};
use crate::search::{SchemaDocument, SimilaritySearch};

/// What a hint proposes to correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HintKind {
    Column,
    Table,
    Value,
}

impl HintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Table => "table",
            Self::Value => "value",
        }
    }
}

/// One correction candidate drawn from a single search document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairHint {
    pub kind: HintKind,
    /// Token that was searched for.
    pub search_token: String,
    /// Lowercased table of the source document (empty for table-less ones).
    pub source_table: String,
    /// Column lines, a `Table: <name>` line, or sample values, by kind.
    pub candidates: Vec<String>,
}

/// The `(kind, token)` lookup derived from a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTarget {
    pub kind: HintKind,
    pub token: String,
}

/// Full output of one hint extraction.
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub error_type: ErrorKind,
    pub error_message: String,
    pub query: String,
    pub search_targets: Vec<SearchTarget>,
    pub hints: Vec<RepairHint>,
}

/// Derives the search target for a failure.
///
/// First match wins: a `no such column` message, then `no such table`, then
/// a `WHERE <ident> = <value>` comparison in the query text.
pub fn classify_failure(failure: &ExecutionFailure) -> Option<SearchTarget> {
    let message = failure.error_message.to_lowercase();

    if message.contains("no such column") {
        return Some(SearchTarget {
            kind: HintKind::Column,
            token: parse::error_token(&failure.error_message),
        });
    }
    if message.contains("no such table") {
        return Some(SearchTarget {
            kind: HintKind::Table,
            token: parse::error_token(&failure.error_message),
        });
    }
    if failure.query.to_lowercase().contains("where") {
        return parse::where_target(&failure.query).map(|(column, _value)| SearchTarget {
            kind: HintKind::Value,
            token: column,
        });
    }
    None
}

/// Turns execution failures into repair hints using a similarity search.
pub struct HintExtractor<'a> {
    search: &'a dyn SimilaritySearch,
    k: usize,
}

impl<'a> HintExtractor<'a> {
    /// Creates an extractor requesting `config.hint_k` documents per lookup.
    pub fn new(search: &'a dyn SimilaritySearch, config: &SearchConfig) -> Self {
        Self::with_k(search, config.hint_k)
    }

    pub fn with_k(search: &'a dyn SimilaritySearch, k: usize) -> Self {
        Self { search, k }
    }

    /// Returns hints for a failed result; a success yields none.
    pub async fn extract_hints(&self, result: &ExecutionResult) -> Vec<RepairHint> {
        match result.as_failure() {
            Some(failure) => self.report(failure).await.hints,
            None => Vec::new(),
        }
    }

    /// Classifies `failure` and collects hints for its search target.
    pub async fn report(&self, failure: &ExecutionFailure) -> RepairReport {
        let target = classify_failure(failure);
        let hints = match &target {
            Some(target) => self.hints_for(target).await,
            None => {
                debug!("No repair target for: {}", failure.error_message);
                Vec::new()
            }
        };

        RepairReport {
            error_type: failure.error_type,
            error_message: failure.error_message.clone(),
            query: failure.query.clone(),
            search_targets: target.into_iter().collect(),
            hints,
        }
    }

    async fn hints_for(&self, target: &SearchTarget) -> Vec<RepairHint> {
        let documents = match self.search.search(&target.token, self.k).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!("Search failed for '{}': {}", target.token, e);
                return Vec::new();
            }
        };

        let hints: Vec<RepairHint> = documents
            .iter()
            .filter_map(|doc| hint_from_document(target, doc))
            .collect();
        debug!(
            "{} {} hint(s) for '{}' from {} document(s)",
            hints.len(),
            target.kind.as_str(),
            target.token,
            documents.len()
        );
        hints
    }
}

fn hint_from_document(target: &SearchTarget, doc: &SchemaDocument) -> Option<RepairHint> {
    let table = doc.table_name().to_lowercase();

    let candidates = match target.kind {
        HintKind::Column => parse::matching_column_lines(&doc.content, &target.token),
        HintKind::Table if table.contains(target.token.as_str()) => {
            vec![format!("Table: {table}")]
        }
        HintKind::Table => Vec::new(),
        HintKind::Value => parse::sample_values(&doc.content, &target.token),
    };

    if candidates.is_empty() {
        return None;
    }
    Some(RepairHint {
        kind: target.kind,
        search_token: target.token.clone(),
        source_table: table,
        candidates,
    })
}

/// Extracts repair hints for `result`, requesting `k` documents per lookup.
pub async fn extract_hints(
    result: &ExecutionResult,
    search: &dyn SimilaritySearch,
    k: usize,
) -> Vec<RepairHint> {
    HintExtractor::with_k(search, k).extract_hints(result).await
}
