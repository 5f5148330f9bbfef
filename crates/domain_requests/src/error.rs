//! Document request errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised by document request searches and lookups
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request, batch or content is missing
    #[error("{0}")]
    NotFound(String),

    /// A search or lookup argument violates a constraint
    #[error("{0}")]
    InvalidRequest(String),

    /// Reserved; never raised by the service itself
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The persistence layer failed
    #[error("Storage failure: {0}")]
    Storage(#[source] PortError),
}

impl RequestError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RequestError::InvalidRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RequestError::NotFound(message.into())
    }
}

impl From<PortError> for RequestError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => {
                RequestError::NotFound(format!("{entity_type} not found with ID: {id}"))
            }
            PortError::Conflict { message } => RequestError::Conflict(message),
            other => RequestError::Storage(other),
        }
    }
}
