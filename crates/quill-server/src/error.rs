//! Server error type mapping to HTTP status codes.
//!
//! Validation and integrity failures never reach this type; handlers recover
//! them locally into flash messages. What remains is the taxonomy a user can
//! still hit (missing post, foreign post) plus unexpected storage faults,
//! which surface as a generic 500 page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::render;

/// Errors a route handler can return.
#[derive(Debug, Error)]
pub enum AppError {
    /// The requested resource doesn't exist.
    #[error("{0}")]
    NotFound(String),
    /// The current user may not act on this resource.
    #[error("{0}")]
    Forbidden(String),
    /// Anything unexpected: pool exhaustion, SQL faults, task join failures.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(format!("db connection failed: {e}"))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Internal(format!("database error: {e}"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("task join error: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                // The detail stays in the log; the client gets a generic page.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong.".to_string(),
                )
            }
        };

        (status, Html(render::error_page(status, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_variants() {
        let res = AppError::NotFound("Post id 7 doesn't exist.".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = AppError::Forbidden("not the author".into()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = AppError::Internal("boom".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
