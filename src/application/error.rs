//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{BusinessErrors, DomainError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Broken business rules, when the failure is a rejected action.
    pub fn business_errors(&self) -> Option<&BusinessErrors> {
        match self {
            ApplicationError::Domain(err) => err.business_errors(),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
