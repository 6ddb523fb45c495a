//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, NodeId};
use crate::infrastructure::error::StoreError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("caller is not authenticated")]
    Unauthorized,

    #[error("insertion still contended after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("store failed: {context}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

/// Transport-independent classification of an [`ApplicationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Unauthorized,
    Conflict,
    Config,
    Internal,
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Domain(_) | ApplicationError::InvalidArgument(_) => {
                ErrorKind::InvalidArgument
            }
            ApplicationError::NotFound(_) => ErrorKind::NotFound,
            ApplicationError::Unauthorized => ErrorKind::Unauthorized,
            ApplicationError::Conflict { .. } => ErrorKind::Conflict,
            ApplicationError::Config { .. } => ErrorKind::Config,
            ApplicationError::Store { .. } => ErrorKind::Internal,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
