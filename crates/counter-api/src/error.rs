//! Error types for the counter HTTP layer.
//!
//! [`ApiError`] converts into an Axum response with a small JSON body.
//! Malformed request bodies never reach it: Axum's `Json` extractor
//! rejects them with its own 4xx response first.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the counter API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No route matched the request path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service is shutting down and no longer opens streams.
    #[error("service unavailable: {0}")]
    ShuttingDown(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::ShuttingDown(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
