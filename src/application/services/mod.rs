//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the store boundary trait but are themselves concrete
//! structs, not traits.

mod query;
mod tree;

pub use query::{CreateNode, QueryFailure, QueryResult, QueryService};
pub use tree::TreeService;
