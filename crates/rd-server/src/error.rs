//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rd_site::{IndexError, UnknownCache};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No page at the requested slug.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Listing, tree or page could not be built.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Invalidation named a cache that does not exist.
    #[error(transparent)]
    UnknownCache(#[from] UnknownCache),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::Index(e) => {
                tracing::error!(error = %e, "Request failed");
                let status = match e {
                    IndexError::Listing(_) | IndexError::Fetch { .. } => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, json!({"error": e.to_string(), "path": e.path()}))
            }
            Self::UnknownCache(e) => (StatusCode::NOT_FOUND, json!({"error": e.to_string()})),
        };

        (status, axum::Json(body)).into_response()
    }
}
