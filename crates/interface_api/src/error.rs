//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_pledge::PlanError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Validation failure, optionally scoped to a request field
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
}

/// A single field-scoped problem within a validation failure
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
            ApiError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg, None)
            }
            ApiError::Validation { message, field } => {
                let details = field.map(|field| {
                    vec![ErrorDetail {
                        field,
                        message: message.clone(),
                    }]
                });
                (StatusCode::BAD_REQUEST, "validation_error", message, details)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

/// Maps domain plan errors onto HTTP status codes
///
/// Validation failures become 400 with the offending field in the details,
/// stale version tokens become 409, and anything from the persistence layer
/// stays a 500 without leaking query text.
impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match &err {
            PlanError::NotFound(id) => ApiError::NotFound(format!("Plan {} not found", id)),
            PlanError::VersionConflict { expected, actual } => ApiError::Conflict(format!(
                "Plan was modified concurrently (expected version {}, found {})",
                expected, actual
            )),
            PlanError::Persistence(_) => ApiError::Database(err.to_string()),
            _ if err.is_validation() => {
                let field = err.field().map(str::to_string);
                ApiError::Validation {
                    message: err.to_string(),
                    field,
                }
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PlanId;

    #[test]
    fn plan_not_found_maps_to_404() {
        let err = ApiError::from(PlanError::NotFound(PlanId::new()));
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn version_conflict_maps_to_409() {
        let err = ApiError::from(PlanError::VersionConflict {
            expected: 3,
            actual: 5,
        });
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn total_mismatch_maps_to_validation_with_field() {
        let err = ApiError::from(PlanError::TotalMismatch {
            expected: 5000,
            actual: 4995,
        });
        match err {
            ApiError::Validation { field, .. } => {
                assert_eq!(field.as_deref(), Some("total_planned_amount"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
