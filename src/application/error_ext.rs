//! Error conversion helpers for store operations

use std::fmt::Display;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::error::StoreResult;

/// Extension trait for converting `StoreResult` to `ApplicationResult` with context.
pub trait StoreResultExt<T> {
    /// Add context to a store error.
    ///
    /// # Example
    /// ```ignore
    /// self.store.node(id).with_store_context(format_args!("read node {id}"))?;
    /// ```
    fn with_store_context(self, action: impl Display) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn with_store_context(self, action: impl Display) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Store {
            context: action.to_string(),
            source,
        })
    }
}
