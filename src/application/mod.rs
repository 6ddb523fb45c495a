//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod messages;
pub mod paging;
pub mod services;

pub use error::{ApplicationError, ApplicationResult, ErrorKind};
pub use error_ext::StoreResultExt;
pub use messages::{Locale, Message};
pub use paging::{PageParams, PageRequest, PagingError};
