//! Versioned record errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised by the temporal record store
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record, or every record of a keyed lookup, is missing
    #[error("{0}")]
    NotFound(String),

    /// The request was rejected before touching storage
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reserved for uniqueness violations; never raised by the store itself
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The persistence layer failed
    #[error("Storage failure: {0}")]
    Storage(#[source] PortError),
}

impl RecordError {
    /// "<Kind> not found with ID: <id>"
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        RecordError::NotFound(format!("{kind} not found with ID: {id}"))
    }
}

impl From<PortError> for RecordError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => RecordError::not_found(&entity_type, id),
            PortError::Conflict { message } => RecordError::Conflict(message),
            other => RecordError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_keeps_message_shape() {
        let error: RecordError = PortError::not_found("Reference data", 7).into();
        assert_eq!(error.to_string(), "Reference data not found with ID: 7");
    }

    #[test]
    fn test_connection_failure_is_storage() {
        let error: RecordError = PortError::Connection {
            message: "pool timed out".into(),
            source: None,
        }
        .into();
        assert!(matches!(error, RecordError::Storage(_)));
    }
}
