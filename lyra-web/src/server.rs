//! Router assembly and server startup
//!
//! Wires the catalog resolver into shared state, mounts the streaming and
//! health routes, and applies CORS and request tracing.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use lyra_core::config::LyraConfig;
use lyra_core::{CatalogResolver, JsonFileCatalog};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::{api_health, stream_track};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Resolves track ids to files; reloads the catalog per call
    pub resolver: CatalogResolver,
    /// Effective configuration
    pub config: Arc<LyraConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds state reading the catalog file and media root named in `config`.
    pub fn from_config(config: LyraConfig) -> Self {
        let source = Arc::new(JsonFileCatalog::new(config.media.catalog_path.clone()));
        let resolver = CatalogResolver::new(source, config.media.media_root.clone());
        Self::new(resolver, config)
    }

    /// Builds state around an existing resolver.
    pub fn new(resolver: CatalogResolver, config: LyraConfig) -> Self {
        Self {
            resolver,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

/// Creates the application router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    Router::new()
        // Streaming endpoints
        .route("/media/tracks/{id}/stream", get(stream_track))
        .route("/api/music/stream/{id}", get(stream_track))
        // JSON API endpoints
        .route("/api/health", get(api_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy: an explicit allowlist, or any origin when the list is empty.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::RANGE, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ])
        .allow_credentials(true)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// - `Box<dyn std::error::Error>` - Invalid listen address, bind failure, or server I/O error
pub async fn run_server(config: LyraConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.socket_addr()?;

    info!(
        "Serving media from {} with catalog {}",
        config.media.media_root.display(),
        config.media.catalog_path.display()
    );

    let app = build_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Lyra media server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lyra media server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lyra_core::test_fixtures::MediaFixture;
    use tower::ServiceExt;

    use super::*;

    fn state_for(fixture: &MediaFixture, allowed_origins: Vec<String>) -> AppState {
        let mut config = LyraConfig::default();
        config.media.media_root = fixture.root().to_path_buf();
        config.media.catalog_path = fixture.catalog_path();
        config.server.allowed_origins = allowed_origins;
        AppState::from_config(config)
    }

    #[tokio::test]
    async fn test_health_reports_track_count() {
        let fixture = MediaFixture::new().with_catalog(r#"[{"id": 1, "filename": "a.mp3"}]"#);
        let app = build_router(state_for(&fixture, Vec::new()));

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["tracks"], 1);
    }

    #[tokio::test]
    async fn test_health_without_catalog() {
        let fixture = MediaFixture::new();
        let app = build_router(state_for(&fixture, Vec::new()));

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["tracks"].is_null());
    }

    #[tokio::test]
    async fn test_cors_allowlist() {
        let fixture = MediaFixture::new().with_catalog("[]");
        let app = build_router(state_for(
            &fixture,
            vec!["http://localhost:5173".to_string()],
        ));

        let allowed = app
            .clone()
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );

        let denied = app
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "http://evil.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(
            denied
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
