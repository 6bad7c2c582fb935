//! Health check endpoint

use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};
use tracing::warn;

use crate::server::AppState;

/// Reports server liveness and whether the catalog currently loads.
///
/// Always answers `200`; `tracks` is `null` when the catalog is unreadable.
pub async fn api_health(State(state): State<AppState>) -> Json<Value> {
    let tracks = match state.resolver.source().load().await {
        Ok(catalog) => Some(catalog.len()),
        Err(e) => {
            warn!("Health check could not load catalog: {e}");
            None
        }
    };

    Json(json!({
        "status": "ok",
        "message": "Lyra media server is running",
        "tracks": tracks,
        "media_root": state.resolver.media_root().display().to_string(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
