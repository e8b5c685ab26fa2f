//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use quadrant_core::auth::{AuthError, TokenError};

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
///
/// Credential and token failures map to 400: the service reports why a
/// request was refused through the message, not the status class.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Credentials(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.clone()),
            AppError::Credentials(m) => (StatusCode::BAD_REQUEST, "authentication_error", m.clone()),
            AppError::Token(e) => (StatusCode::BAD_REQUEST, "token_error", e.to_string()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DbError(sqlx::Error::RowNotFound) => {
                AppError::NotFound("row not found".into())
            }
            AuthError::DbError(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_errors_map_to_http_statuses() {
        let missing: AppError = AuthError::DbError(sqlx::Error::RowNotFound).into();
        assert!(matches!(missing, AppError::NotFound(_)));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let broken: AppError = AuthError::Internal("pool exhausted".into()).into();
        assert!(matches!(broken, AppError::Internal(_)));
        assert_eq!(
            broken.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_are_bad_requests() {
        let err: AppError = TokenError::Expired.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
