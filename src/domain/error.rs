//! Domain-level errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::entities::{Language, NodeId};

/// Domain errors represent business rule violations.
/// These are independent of storage and transport concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("names must be provided for all languages, missing: {}", .0.iter().join(", "))]
    MissingNames(Vec<Language>),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("nested-set intervals overlap: node {outer} and node {inner}")]
    Overlap { outer: NodeId, inner: NodeId },
}
