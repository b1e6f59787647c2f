// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use super::validation::ValidationResult;
use crate::auth::provider::ProviderError;
use crate::selections::services::SelectionError;

/// API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServer(String),

    #[error("Database Error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    /// Sign-in, provisioning or password change refused by the identity provider
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Shortlist write rejected by the selection store
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// JSON error response structure
///
/// `error` carries the human readable message; clients surface it verbatim.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn into_parts(self) -> (StatusCode, String, &'static str) {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::Provider(err) => match err {
                ProviderError::NotConfigured => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Sign-in is not configured".to_string(),
                    "PROVIDER_NOT_CONFIGURED",
                ),
                ProviderError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid username or password".to_string(),
                    "INVALID_CREDENTIALS",
                ),
                ProviderError::Rejected(msg) => (StatusCode::BAD_REQUEST, msg, "PROVIDER_REJECTED"),
                ProviderError::RequestFailed(msg) => {
                    error!(error = %msg, "Identity provider unreachable");
                    (
                        StatusCode::BAD_GATEWAY,
                        "Identity provider unavailable".to_string(),
                        "PROVIDER_UNAVAILABLE",
                    )
                }
            },
            ApiError::Selection(err) => match err {
                SelectionError::ApplicationNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    format!("Application {} not found", id),
                    "APPLICATION_NOT_FOUND",
                ),
                SelectionError::InvalidSubject(msg) => {
                    (StatusCode::BAD_REQUEST, msg, "INVALID_SUBJECT")
                }
                SelectionError::DatabaseError(e) => ApiError::DatabaseError(e).into_parts(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = self.into_parts();

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Collects every failed field into one `ValidationError`
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
