//! JSON error responses for API handlers

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lyra_core::ResolveError;
use serde_json::json;
use tracing::error;

/// Failure of a media request, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Track id in the path is not an integer
    #[error("Invalid track id: {0}")]
    InvalidTrackId(String),

    /// `quality` query parameter names no known tier
    #[error("Invalid quality: {0}")]
    InvalidQuality(String),

    /// Catalog lookup or file resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTrackId(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidQuality(_) => StatusCode::BAD_REQUEST,
            ApiError::Resolve(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Resolve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the JSON body.
    pub fn message(&self) -> &'static str {
        match self {
            // Non-numeric ids can never match a catalog entry
            ApiError::InvalidTrackId(_) => "Track not found",
            ApiError::InvalidQuality(_) => "Invalid quality",
            ApiError::Resolve(e) => e.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Media request failed: {self}");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
