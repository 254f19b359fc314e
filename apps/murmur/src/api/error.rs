//! API error mapping.
//!
//! `CoreError` carries no HTTP knowledge; this module assigns status
//! codes and renders the failure envelope. Internal storage errors are
//! logged and collapsed into a generic 500 so details never leak.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use murmur_core::{CoreError, FieldError};
use serde_json::json;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<Vec<FieldError>>,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication required")
    }

    #[must_use]
    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "too many attempts, try again later",
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(fields) => Self {
                status: StatusCode::BAD_REQUEST,
                message: "validation failed".to_string(),
                errors: Some(fields),
            },
            CoreError::NotFound(what) => {
                Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
            }
            CoreError::DuplicateEmail => Self::new(StatusCode::CONFLICT, err.to_string()),
            CoreError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            CoreError::Unauthorized => Self::unauthorized(),
            CoreError::Forbidden => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            CoreError::Poisoned
            | CoreError::Database(_)
            | CoreError::Transaction(_)
            | CoreError::Table(_)
            | CoreError::Storage(_)
            | CoreError::Commit(_)
            | CoreError::Codec(_) => {
                tracing::error!(error = %err, "internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.errors {
            Some(errors) => json!({
                "success": false,
                "message": self.message,
                "errors": errors,
            }),
            None => json!({
                "success": false,
                "message": self.message,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_errors() {
        let err: ApiError =
            CoreError::invalid("text", "Post cannot exceed 500 characters").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (CoreError::NotFound("post"), StatusCode::NOT_FOUND),
            (CoreError::DuplicateEmail, StatusCode::CONFLICT),
            (CoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CoreError::Unauthorized, StatusCode::UNAUTHORIZED),
            (CoreError::Forbidden, StatusCode::FORBIDDEN),
            (CoreError::Poisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (core, status) in cases {
            let err: ApiError = core.into();
            assert_eq!(err.status, status);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err: ApiError = CoreError::Poisoned.into();
        assert_eq!(err.message, "server error");
    }
}
