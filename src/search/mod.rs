//! Similarity search over schema documents.
//!
//! The hint extractor and the context retriever only depend on the
//! [`SimilaritySearch`] trait: ranked `(text, table)` documents for a query
//! string. [`SchemaIndex`] is the local, persisted implementation.

pub mod context;
pub mod index;
mod mock;

pub use context::{extract_keywords, schema_context, ContextSnippet, SchemaContext};
pub use index::{open_or_build, SchemaIndex};
pub use mock::{FailingSearch, StaticSearch};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trait for similarity search collaborators.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Returns up to `k` documents most similar to `text`, best first.
    async fn search(&self, text: &str, k: usize) -> Result<Vec<SchemaDocument>>;
}

/// What a document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// One table: columns, keys, sample rows.
    #[default]
    Schema,
    /// A generic SQL shape, not tied to a table.
    SqlPattern,
}

/// A unit of similarity search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Document text.
    pub content: String,
    /// Table the document describes, if any.
    pub table: Option<String>,
    #[serde(default)]
    pub kind: DocumentKind,
}

impl SchemaDocument {
    /// Creates a schema document for `table`.
    pub fn schema(content: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            table: Some(table.into()),
            kind: DocumentKind::Schema,
        }
    }

    /// Creates a table-less SQL pattern document.
    pub fn sql_pattern(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            table: None,
            kind: DocumentKind::SqlPattern,
        }
    }

    /// Table name, or the empty string for table-less documents.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or("")
    }
}

/// Generic SQL pattern documents indexed next to the schema documents.
pub fn sql_pattern_documents() -> Vec<SchemaDocument> {
    vec![
        SchemaDocument::sql_pattern(
            "SELECT columns FROM table WHERE condition - Basic selection pattern",
        ),
        SchemaDocument::sql_pattern(
            "SELECT t1.*, t2.* FROM table1 t1 JOIN table2 t2 ON t1.id=t2.fk - Join pattern",
        ),
    ]
}
