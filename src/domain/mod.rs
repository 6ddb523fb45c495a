//! Domain layer: entities and nested-set logic
//!
//! This layer is independent of external concerns (no storage, no transport, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod names;
pub mod nested_set;

pub use arena::{NodeData, OrgForest, TreeNode};
pub use entities::*;
pub use error::DomainError;
pub use nested_set::{BoundaryShift, ConsistencyReport, InsertionPlan, Violation};
