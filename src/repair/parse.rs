//! String heuristics used to turn engine messages and schema documents into
//! repair hints.
//!
//! Matching is literal substring and exact-header comparison, no fuzzing.

use regex::Regex;
use std::sync::OnceLock;

fn where_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)where\s+(\w+)\s*=\s*['"]?([\w\s]+)['"]?"#).ok())
        .as_ref()
}

/// Extracts the offending identifier from an engine message.
///
/// Takes the text after the last `:`, trims and lowercases it, then drops any
/// qualifier before the last `.` (`"no such column: s.first_nam"` gives
/// `first_nam`).
pub fn error_token(message: &str) -> String {
    let tail = message.rsplit(':').next().unwrap_or(message);
    let token = tail.trim().to_lowercase();
    match token.rsplit_once('.') {
        Some((_, name)) => name.to_string(),
        None => token,
    }
}

/// Finds the first `WHERE <ident> = <value>` comparison in a query.
///
/// Returns the lowercased identifier and value.
pub fn where_target(query: &str) -> Option<(String, String)> {
    let caps = where_regex()?.captures(query)?;
    let column = caps.get(1)?.as_str().to_lowercase();
    let value = caps.get(2)?.as_str().to_lowercase();
    Some((column, value))
}

/// Column lines of a schema document that mention `token`.
///
/// A column line starts with `-` once trimmed. The match is a case-sensitive
/// substring test on the untrimmed line; returned lines are trimmed.
pub fn matching_column_lines(content: &str, token: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| line.trim().starts_with('-') && line.contains(token))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Distinct sample values of `column` from a document's `Sample Data`
/// section, in first-seen order.
///
/// The section is read from the first `Sample Data` occurrence: the next line
/// holds the `|`-separated headers, the one after is the separator, and the
/// rest are data rows. The header must equal `column` exactly. Empty cells
/// are skipped.
pub fn sample_values(content: &str, column: &str) -> Vec<String> {
    let Some(start) = content.find("Sample Data") else {
        return Vec::new();
    };

    let mut lines = content[start..].lines().skip(1);
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let Some(idx) = header_line.split('|').map(str::trim).position(|h| h == column) else {
        return Vec::new();
    };

    let mut values: Vec<String> = Vec::new();
    for row in lines.skip(1) {
        let Some(cell) = row.split('|').map(str::trim).nth(idx) else {
            continue;
        };
        if !cell.is_empty() && !values.iter().any(|v| v == cell) {
            values.push(cell.to_string());
        }
    }
    values
}
