//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{BusinessErrors, DomainError};
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(value: ApplicationError) -> Self {
        CliError::Infra(value.into())
    }
}

impl From<DomainError> for CliError {
    fn from(value: DomainError) -> Self {
        CliError::Infra(value.into())
    }
}

impl CliError {
    /// Broken business rules behind a rejected action.
    pub fn business_errors(&self) -> Option<&BusinessErrors> {
        match self {
            CliError::Infra(InfraError::Application(e)) => e.business_errors(),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => exitcode::NOINPUT,
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Fixture { .. } => exitcode::DATAERR,
                InfraError::Application(ApplicationError::Config { .. }) => exitcode::CONFIG,
                InfraError::Application(ApplicationError::Domain(domain)) => match domain {
                    DomainError::Business(_) => exitcode::DATAERR,
                    DomainError::NodeNotFound { .. }
                    | DomainError::ProgramTreeNotFound(_)
                    | DomainError::ProgramTreeVersionNotFound(_) => exitcode::NOINPUT,
                    _ => exitcode::SOFTWARE,
                },
                InfraError::Application(ApplicationError::OperationFailed { .. }) => exitcode::SOFTWARE,
            },
        }
    }
}
