//! Unified error handling.
//!
//! Provides a unified `AppError` type for route handlers. Form-level failures
//! are usually handled in the route with a redirect carrying an error query
//! param; `AppError` is the fallthrough for everything propagated with `?`.
//! All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Form input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// User is authenticated but not allowed to act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors; client errors resolve to a page or redirect
        if matches!(self, Self::Database(_)) {
            tracing::error!(error = %self, "Request error");
        }

        match &self {
            // Logged in but not owner/admin: safe default view with a notice
            Self::Forbidden(_) => Redirect::to("/dashboard?notice=forbidden").into_response(),

            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),

            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()).into_response(),

            Self::Auth(err) => {
                let status = match err {
                    AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    AuthError::DuplicateEmail => StatusCode::CONFLICT,
                    AuthError::WrongCurrentPassword
                    | AuthError::PasswordMismatch
                    | AuthError::WeakPassword(_)
                    | AuthError::InvalidEmail(_)
                    | AuthError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
                    AuthError::UserNotFound => StatusCode::NOT_FOUND,
                    AuthError::Repository(_) | AuthError::PasswordHash => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                // Don't reveal whether the email exists
                let message = match err {
                    AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                    AuthError::Repository(_) | AuthError::PasswordHash => {
                        "Internal server error".to_string()
                    }
                    other => other.to_string(),
                };
                (status, message).into_response()
            }

            // Don't expose internal error details to clients
            Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<crate::policy::Forbidden> for AppError {
    fn from(err: crate::policy::Forbidden) -> Self {
        Self::Forbidden(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::Validation("price is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: price is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "test".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::DuplicateEmail)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_forbidden_redirects_to_dashboard() {
        let response = AppError::Forbidden("not the owner".to_string()).into_response();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], "/dashboard?notice=forbidden");
    }
}
