//! Display-name resolution over a node's name entries.

use crate::domain::entities::{Language, NameEntry, NodeId};

/// Placeholder shown when a node has no usable name at all.
pub fn placeholder(id: NodeId) -> String {
    format!("Node {id}")
}

/// Exact lookup: the entry for `requested`, with no fallback.
///
/// `requested` is matched case-sensitively against the closed language set;
/// an unknown tag finds nothing.
pub fn exact<'a>(entries: &'a [NameEntry], requested: &str) -> Option<&'a str> {
    let language = Language::parse(requested)?;
    find(entries, language)
}

/// Display resolution: requested language, then `fallback`, then the placeholder.
///
/// Never fails.
pub fn resolve(id: NodeId, entries: &[NameEntry], requested: &str, fallback: Language) -> String {
    exact(entries, requested)
        .or_else(|| find(entries, fallback))
        .map(str::to_string)
        .unwrap_or_else(|| placeholder(id))
}

/// Case-insensitive substring match used by children search.
pub fn matches_keyword(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}

fn find(entries: &[NameEntry], language: Language) -> Option<&str> {
    entries
        .iter()
        .find(|e| e.language == language)
        .map(|e| e.name.as_str())
}
