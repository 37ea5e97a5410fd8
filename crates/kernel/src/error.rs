//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rootline_sdk::error::AccessDenied;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("access denied")]
    AccessDenied(#[from] AccessDenied),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
        };

        // Log details, keep the response body vague
        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::AccessDenied(e) => {
                tracing::info!(
                    module = %e.module,
                    capability = %e.capability,
                    tree = %e.tree,
                    "access denied"
                );
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
