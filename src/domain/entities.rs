//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Stable identity of a node, assigned by the store at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A position in the hierarchy, encoded as a nested-set interval.
///
/// The open interval `(lft, rgt)` strictly contains the intervals of all
/// descendants and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: NodeId,
    /// Depth; a direct child sits at `parent.level + 1`
    pub level: i64,
    /// Left boundary
    pub lft: i64,
    /// Right boundary
    pub rgt: i64,
}

impl Node {
    /// Number of nodes below this one, at any depth.
    ///
    /// Each node occupies two boundary slots, so the span between `lft` and
    /// `rgt` divided by two counts every descendant, not only direct children.
    pub fn children_count(&self) -> i64 {
        (self.rgt - self.lft - 1) / 2
    }

    /// True if `other` lies strictly inside this node's interval.
    pub fn contains(&self, other: &Node) -> bool {
        self.lft < other.lft && other.rgt < self.rgt
    }

    pub fn is_leaf(&self) -> bool {
        self.rgt == self.lft + 1
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node {} (level: {}, lft: {}, rgt: {})",
            self.id, self.level, self.lft, self.rgt
        )
    }
}

/// Closed set of languages a node name can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Italian,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Italian];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Italian => "Italian",
        }
    }

    /// Exact (case-sensitive) match against the stored language tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == tag)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownLanguage(s.to_string()))
    }
}

/// Translation of a node's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub node_id: NodeId,
    pub language: Language,
    pub name: String,
}

impl NameEntry {
    pub fn new(node_id: NodeId, language: Language, name: impl Into<String>) -> Self {
        Self {
            node_id,
            language,
            name: name.into(),
        }
    }
}

/// Names for a node about to be inserted, keyed by a validated language.
///
/// Construction goes through [`NameSet::validate`], so a value of this type
/// always covers every required language with a non-blank name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameSet(BTreeMap<Language, String>);

impl NameSet {
    /// Validate a loosely-typed `language -> name` map.
    ///
    /// - keys outside the closed language set are rejected
    /// - every language in `required` must carry a name that is non-blank after trim
    /// - blank names for languages that are not required are dropped
    ///
    /// Names are kept exactly as supplied.
    pub fn validate(
        raw: &BTreeMap<String, String>,
        required: &[Language],
    ) -> Result<Self, DomainError> {
        let mut names = BTreeMap::new();
        for (tag, name) in raw {
            let language: Language = tag.parse()?;
            if !name.trim().is_empty() {
                names.insert(language, name.clone());
            }
        }

        let missing: Vec<Language> = required
            .iter()
            .copied()
            .filter(|l| !names.contains_key(l))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::MissingNames(missing));
        }

        Ok(Self(names))
    }

    pub fn get(&self, language: Language) -> Option<&str> {
        self.0.get(&language).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        self.0.iter().map(|(l, n)| (*l, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bind the names to a freshly created node.
    pub fn entries_for(&self, node_id: NodeId) -> Vec<NameEntry> {
        self.iter()
            .map(|(language, name)| NameEntry::new(node_id, language, name))
            .collect()
    }
}

/// Consumer-facing rendering of a node in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub node_id: NodeId,
    pub name: String,
    pub children_count: i64,
}

impl NodeView {
    pub fn new(node: &Node, name: impl Into<String>) -> Self {
        Self {
            node_id: node.id,
            name: name.into(),
            children_count: node.children_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn given_company_node_when_counting_children_then_counts_all_descendants() {
        let company = Node {
            id: NodeId(5),
            level: 1,
            lft: 1,
            rgt: 24,
        };
        assert_eq!(company.children_count(), 11);
    }

    #[test]
    fn given_leaf_when_counting_children_then_zero() {
        let leaf = Node {
            id: NodeId(1),
            level: 2,
            lft: 2,
            rgt: 3,
        };
        assert_eq!(leaf.children_count(), 0);
        assert!(leaf.is_leaf());
    }

    #[test]
    fn given_language_tags_when_parsing_then_matches_exactly() {
        assert_eq!(Language::parse("English"), Some(Language::English));
        assert_eq!(Language::parse("Italian"), Some(Language::Italian));
        assert_eq!(Language::parse("english"), None);
        assert_eq!(Language::parse("French"), None);
    }

    #[test]
    fn given_complete_names_when_validating_then_keeps_supplied_values() {
        let names = NameSet::validate(
            &raw(&[("English", " Sales "), ("Italian", "Vendite")]),
            &Language::ALL,
        )
        .unwrap();
        assert_eq!(names.get(Language::English), Some(" Sales "));
        assert_eq!(names.get(Language::Italian), Some("Vendite"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn given_blank_italian_when_validating_then_reports_italian_missing() {
        let err = NameSet::validate(
            &raw(&[("English", "Sales"), ("Italian", "   ")]),
            &Language::ALL,
        )
        .unwrap_err();
        match err {
            DomainError::MissingNames(missing) => assert_eq!(missing, vec![Language::Italian]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_empty_map_when_validating_then_reports_all_required_missing() {
        let err = NameSet::validate(&BTreeMap::new(), &Language::ALL).unwrap_err();
        assert!(matches!(err, DomainError::MissingNames(ref m) if m.len() == 2));
        assert!(err.to_string().contains("English, Italian"));
    }

    #[test]
    fn given_unknown_language_key_when_validating_then_rejected() {
        let err = NameSet::validate(
            &raw(&[("English", "A"), ("Italian", "B"), ("French", "C")]),
            &Language::ALL,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::UnknownLanguage(ref tag) if tag == "French"));
    }

    #[test]
    fn given_optional_blank_language_when_validating_then_dropped() {
        let names = NameSet::validate(
            &raw(&[("English", "A"), ("Italian", "")]),
            &[Language::English],
        )
        .unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(Language::Italian), None);
    }
}
