//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use domain_reference::RecordError;
use domain_requests::RequestError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase of the status
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound(msg) => ApiError::NotFound(msg),
            RecordError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            RecordError::Conflict(msg) => ApiError::Conflict(msg),
            RecordError::Storage(source) => {
                error!(error = %source, "Versioned record storage failure");
                ApiError::Internal("Storage failure".to_string())
            }
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound(msg) => ApiError::NotFound(msg),
            RequestError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            RequestError::Conflict(msg) => ApiError::Conflict(msg),
            RequestError::Storage(source) => {
                error!(error = %source, "Document request storage failure");
                ApiError::Internal("Storage failure".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::MissingPermission(permission) => {
                ApiError::Forbidden(format!("Missing permission: {permission}"))
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let reasons: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        messages.sort();
        ApiError::BadRequest(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (RecordError::not_found("Reference data", 9).into(), StatusCode::NOT_FOUND),
            (RequestError::invalid("Page size must be >= 1").into(), StatusCode::BAD_REQUEST),
            (RecordError::Conflict("dup".into()).into(), StatusCode::CONFLICT),
            (
                RequestError::Storage(PortError::Connection {
                    message: "down".into(),
                    source: None,
                })
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::MissingPermission("reference_data.write".into()).into(),
                StatusCode::FORBIDDEN,
            ),
            (AuthError::TokenExpired.into(), StatusCode::UNAUTHORIZED),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_not_found_message_passes_through() {
        let error: ApiError = RecordError::not_found("Reference data", 9).into();
        assert_eq!(error.to_string(), "Reference data not found with ID: 9");
    }
}
