//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::services::QueryFailure;
use crate::application::ErrorKind;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{}", .0.message)]
    Query(QueryFailure),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("tree is inconsistent: {violations} violation(s)")]
    Inconsistent { violations: usize },
}

impl From<QueryFailure> for CliError {
    fn from(failure: QueryFailure) -> Self {
        CliError::Query(failure)
    }
}

impl From<crate::application::ApplicationError> for CliError {
    fn from(e: crate::application::ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

fn kind_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidArgument => crate::exitcode::DATAERR,
        ErrorKind::NotFound => crate::exitcode::NOINPUT,
        ErrorKind::Unauthorized => crate::exitcode::NOPERM,
        ErrorKind::Conflict => crate::exitcode::TEMPFAIL,
        ErrorKind::Config => crate::exitcode::CONFIG,
        ErrorKind::Internal => crate::exitcode::SOFTWARE,
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Query(failure) => kind_exit_code(failure.kind),
            CliError::Inconsistent { .. } => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Store { .. } => crate::exitcode::UNAVAILABLE,
                InfraError::Server { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(e) => kind_exit_code(e.kind()),
            },
        }
    }
}
