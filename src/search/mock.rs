//! Similarity search doubles for testing.
//!
//! Provides deterministic collaborators for hint extraction tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{SchemaDocument, SimilaritySearch};
use crate::error::{Result, SqlmendError};

/// A search that returns a fixed document list, truncated to `k`.
///
/// Records each query it receives so tests can assert on the lookup token.
#[derive(Debug, Default)]
pub struct StaticSearch {
    documents: Vec<SchemaDocument>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticSearch {
    /// Creates a search returning `documents` in order.
    pub fn new(documents: Vec<SchemaDocument>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the `(text, k)` pairs received so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SimilaritySearch for StaticSearch {
    async fn search(&self, text: &str, k: usize) -> Result<Vec<SchemaDocument>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((text.to_string(), k));
        }
        Ok(self.documents.iter().take(k).cloned().collect())
    }
}

/// A search that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingSearch {
    message: String,
}

impl FailingSearch {
    /// Creates a failing search with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl SimilaritySearch for FailingSearch {
    async fn search(&self, _text: &str, _k: usize) -> Result<Vec<SchemaDocument>> {
        Err(SqlmendError::search(self.message.clone()))
    }
}
