//! Local similarity index over schema documents.
//!
//! Each document is turned into a sparse, L2-normalized term vector made of
//! lowercased words, the parts of snake_case identifiers, and character
//! trigrams (so `first_nam` still lands near `first_name`). Queries are ranked
//! by cosine similarity. The index is persisted as JSON in the store directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{sql_pattern_documents, SchemaDocument, SimilaritySearch};
use crate::config::Config;
use crate::db;
use crate::error::{Result, SqlmendError};

/// File name of the persisted index inside the store directory.
pub const INDEX_FILE: &str = "index.json";

const WORD_WEIGHT: f32 = 1.0;
const PART_WEIGHT: f32 = 0.75;
const TRIGRAM_WEIGHT: f32 = 0.5;

type TermVector = HashMap<String, f32>;

/// In-memory similarity index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    document: SchemaDocument,
    vector: TermVector,
}

impl SchemaIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `documents`, keeping their order for tie-breaks.
    pub fn from_documents(documents: impl IntoIterator<Item = SchemaDocument>) -> Self {
        let mut index = Self::new();
        for document in documents {
            index.add(document);
        }
        index
    }

    /// Adds one document.
    pub fn add(&mut self, document: SchemaDocument) {
        let vector = term_vector(&document.content);
        self.entries.push(IndexEntry { document, vector });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.entries.iter().map(|e| &e.document)
    }

    /// Returns the `k` best documents with their scores, best first.
    ///
    /// Ties keep insertion order.
    pub fn rank(&self, text: &str, k: usize) -> Vec<(f32, &SchemaDocument)> {
        let query = term_vector(text);
        let mut scored: Vec<(f32, &SchemaDocument)> = self
            .entries
            .iter()
            .map(|entry| (cosine(&query, &entry.vector), &entry.document))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Returns the index file path inside `dir`.
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Returns true if a persisted index exists in `dir`.
    pub fn exists(dir: &Path) -> bool {
        Self::file_path(dir).is_file()
    }

    /// Persists the index into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| {
            SqlmendError::io(format!("Failed to create store directory {}: {e}", dir.display()))
        })?;
        let json = serde_json::to_vec(self)
            .map_err(|e| SqlmendError::internal(format!("Failed to serialize index: {e}")))?;
        let path = Self::file_path(dir);
        std::fs::write(&path, json)
            .map_err(|e| SqlmendError::io(format!("Failed to write {}: {e}", path.display())))
    }

    /// Loads a persisted index from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::file_path(dir);
        let bytes = std::fs::read(&path)
            .map_err(|e| SqlmendError::search(format!("Failed to read {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            SqlmendError::search(format!("Corrupt index at {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl SimilaritySearch for SchemaIndex {
    async fn search(&self, text: &str, k: usize) -> Result<Vec<SchemaDocument>> {
        let ranked = self.rank(text, k);
        debug!(
            "Similarity search for {:?}: {} of {} documents",
            text,
            ranked.len(),
            self.len()
        );
        Ok(ranked.into_iter().map(|(_, doc)| doc.clone()).collect())
    }
}

/// Loads the persisted index, or builds it from the configured database.
///
/// With `rebuild`, or when nothing is persisted yet: the store directory is
/// cleared, the database is recreated from `database.schema_script` when one
/// is configured, then introspected and indexed together with the generic
/// SQL pattern documents.
pub async fn open_or_build(config: &Config, rebuild: bool) -> Result<SchemaIndex> {
    let dir = config.store.require_dir()?;

    if !rebuild && SchemaIndex::exists(dir) {
        info!("Reusing existing index in {}", dir.display());
        return SchemaIndex::load(dir);
    }

    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| {
            SqlmendError::io(format!("Failed to clear store {}: {e}", dir.display()))
        })?;
    }

    let db_path = config.database.require_path()?;
    if let Some(script) = &config.database.schema_script {
        db::build_database(db_path, script).await?;
    }

    let schema = db::introspect(db_path).await?;
    let mut documents = schema.to_documents();
    documents.extend(sql_pattern_documents());

    info!("Building index over {} documents", documents.len());
    let index = SchemaIndex::from_documents(documents);
    index.save(dir)?;
    info!("Index ready in {}", dir.display());

    Ok(index)
}

/// Builds the normalized sparse vector for a text.
fn term_vector(text: &str) -> TermVector {
    let mut vector = TermVector::new();

    for word in text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        *vector.entry(word.clone()).or_default() += WORD_WEIGHT;

        if word.contains('_') {
            for part in word.split('_').filter(|p| !p.is_empty()) {
                *vector.entry(part.to_string()).or_default() += PART_WEIGHT;
            }
        }

        let padded: Vec<char> = format!("#{word}#").chars().collect();
        for window in padded.windows(3) {
            let trigram: String = window.iter().collect();
            *vector.entry(format!("~{trigram}")).or_default() += TRIGRAM_WEIGHT;
        }
    }

    let norm = vector.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
    vector
}

/// Cosine similarity of two normalized vectors.
fn cosine(a: &TermVector, b: &TermVector) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum()
}
