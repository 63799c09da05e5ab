//! Keyword-filtered schema context for a natural-language question.
//!
//! Runs a similarity search for the whole question, then keeps only the
//! document lines that mention one of the question's keywords. The result is
//! what a SQL generation step reads to learn which tables and columns matter.

use std::collections::BTreeSet;
use std::fmt;

use super::SimilaritySearch;
use crate::error::Result;

/// Words that never become keywords even though they pass the stop list.
const SKIP_WORDS: &[&str] = &["table", "sum", "great", "column", "row"];

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "all", "also", "and", "any", "are", "because", "been", "before",
    "being", "below", "between", "both", "but", "can", "could", "did", "does", "doing", "down",
    "during", "each", "few", "find", "for", "from", "further", "get", "give", "had", "has",
    "have", "having", "her", "here", "hers", "him", "his", "how", "include", "including", "into",
    "its", "just", "list", "many", "more", "most", "much", "not", "now", "off", "once", "only",
    "other", "our", "out", "over", "own", "please", "same", "she", "should", "show", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "too", "under", "until", "very", "was", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Extracts lookup keywords from a question.
///
/// Words are lowercased and naively singularized; words of three letters or
/// fewer, stop words and [`SKIP_WORDS`] are dropped.
pub fn extract_keywords(question: &str) -> BTreeSet<String> {
    question
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .map(|word| singularize(&word.to_lowercase()))
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .filter(|word| !SKIP_WORDS.contains(&word.as_str()))
        .collect()
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("sses") {
        format!("{stem}ss")
    } else if let Some(stem) = word.strip_suffix("ies").filter(|s| s.len() > 1) {
        format!("{stem}y")
    } else if word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Matching lines from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnippet {
    /// Source table, or `Unknown` for table-less documents.
    pub table: String,
    pub lines: Vec<String>,
}

impl fmt::Display for ContextSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table: {}\n{}", self.table, self.lines.join("\n"))
    }
}

/// Outcome of a context lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaContext {
    /// The search returned nothing.
    NoDocuments,
    /// Documents came back but no line mentioned a keyword.
    NoMatches,
    /// One snippet per document with matching lines, in search order.
    Snippets(Vec<ContextSnippet>),
}

impl fmt::Display for SchemaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocuments => write!(f, "No documents found."),
            Self::NoMatches => write!(
                f,
                "Documents found, but no lines matched your query keywords."
            ),
            Self::Snippets(snippets) => {
                let blocks: Vec<String> = snippets.iter().map(ToString::to_string).collect();
                write!(f, "{}", blocks.join("\n\n"))
            }
        }
    }
}

/// Retrieves keyword-filtered schema context for `question`.
pub async fn schema_context(
    search: &dyn SimilaritySearch,
    question: &str,
    k: usize,
) -> Result<SchemaContext> {
    let keywords = extract_keywords(question);
    let documents = search.search(question, k).await?;
    if documents.is_empty() {
        return Ok(SchemaContext::NoDocuments);
    }

    let snippets: Vec<ContextSnippet> = documents
        .iter()
        .filter_map(|doc| {
            let lines: Vec<String> = doc
                .content
                .lines()
                .filter(|line| {
                    let lower = line.to_lowercase();
                    keywords.iter().any(|kw| lower.contains(kw.as_str()))
                })
                .map(str::to_string)
                .collect();
            (!lines.is_empty()).then(|| ContextSnippet {
                table: doc.table.clone().unwrap_or_else(|| "Unknown".to_string()),
                lines,
            })
        })
        .collect();

    if snippets.is_empty() {
        Ok(SchemaContext::NoMatches)
    } else {
        Ok(SchemaContext::Snippets(snippets))
    }
}
