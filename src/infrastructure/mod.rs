//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements the store and credential boundary traits and wires up services.

pub mod auth;
pub mod di;
pub mod error;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult, StoreError};
