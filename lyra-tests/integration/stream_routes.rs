//! End-to-end checks of the HTTP routes.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use lyra_core::LyraConfig;
use lyra_core::test_fixtures::{MediaFixture, pattern_bytes};
use lyra_web::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const TRACK_LEN: usize = 1_000_000;

/// Catalog with a flac-only tiered track, a legacy track and a track whose
/// file is missing from disk.
fn library() -> MediaFixture {
    MediaFixture::new()
        .with_catalog(
            r#"[
                {"id": 7, "title": "Seven", "artist": "Aryan", "files": {"flac": "a.flac"}},
                {"id": 8, "title": "Eight", "filename": "b.mp3"},
                {"id": 10, "title": "Ghost", "files": {"flac": "ghost.flac", "ogg": "ghost.ogg"}}
            ]"#,
        )
        .with_file("flac/a.flac", TRACK_LEN)
        .with_file("b.mp3", 2048)
}

fn router(fixture: &MediaFixture) -> Router {
    let mut config = LyraConfig::default();
    config.media.media_root = fixture.root().to_path_buf();
    config.media.catalog_path = fixture.catalog_path();
    config.server.allowed_origins = Vec::new();
    build_router(AppState::from_config(config))
}

async fn get(app: Router, uri: &str, range: Option<&str>) -> Response {
    let mut request = Request::get(uri);
    if let Some(range) = range {
        request = request.header(header::RANGE, range);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_full_file_without_range() {
    let fixture = library();
    let response = get(router(&fixture), "/media/tracks/7/stream?quality=flac", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        TRACK_LEN.to_string()
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/flac");
    assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
    assert!(response.headers().get(header::CONTENT_RANGE).is_none());

    assert_eq!(body_bytes(response).await, pattern_bytes(TRACK_LEN));
}

#[tokio::test]
async fn test_first_hundred_bytes() {
    let fixture = library();
    let response = get(
        router(&fixture),
        "/media/tracks/7/stream?quality=flac",
        Some("bytes=0-99"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        format!("bytes 0-99/{TRACK_LEN}")
    );
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "100");

    let body = body_bytes(response).await;
    assert_eq!(body.len(), 100);
    assert_eq!(body, pattern_bytes(100));
}

#[tokio::test]
async fn test_open_ended_range_reaches_last_byte() {
    let fixture = library();
    let start = TRACK_LEN - 4321;
    let response = get(
        router(&fixture),
        "/media/tracks/7/stream",
        Some(&format!("bytes={start}-")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        format!("bytes {start}-{}/{TRACK_LEN}", TRACK_LEN - 1)
    );

    let body = body_bytes(response).await;
    assert_eq!(body, pattern_bytes(TRACK_LEN)[start..]);
}

#[tokio::test]
async fn test_repeated_range_is_identical() {
    let fixture = library();
    let app = router(&fixture);
    let range = Some("bytes=123456-223455");

    let first = body_bytes(get(app.clone(), "/media/tracks/7/stream", range).await).await;
    let second = body_bytes(get(app, "/media/tracks/7/stream", range).await).await;

    assert_eq!(first.len(), 100_000);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_last_byte_only() {
    let fixture = library();
    let last = TRACK_LEN - 1;
    let response = get(
        router(&fixture),
        "/media/tracks/7/stream",
        Some(&format!("bytes={last}-{last}")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "1");
    assert_eq!(body_bytes(response).await, vec![(last % 251) as u8]);
}

#[tokio::test]
async fn test_missing_tier_falls_back_to_flac() {
    let fixture = library();
    let response = get(
        router(&fixture),
        "/media/tracks/7/stream?quality=ogg",
        Some("bytes=0-9"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/flac");
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        format!("bytes 0-9/{TRACK_LEN}")
    );
    assert_eq!(body_bytes(response).await, pattern_bytes(10));
}

#[tokio::test]
async fn test_unknown_track() {
    let fixture = library();
    let response = get(router(&fixture), "/media/tracks/9/stream", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Track not found" }));
}

#[tokio::test]
async fn test_file_missing_from_disk() {
    let fixture = library();
    let response = get(router(&fixture), "/media/tracks/10/stream?quality=ogg", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Music file not found" })
    );
}

#[tokio::test]
async fn test_inverted_range_not_satisfiable() {
    let fixture = library();
    let response = get(
        router(&fixture),
        "/media/tracks/7/stream",
        Some("bytes=500-200"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        format!("bytes */{TRACK_LEN}")
    );
}

#[tokio::test]
async fn test_unsupported_range_forms_not_satisfiable() {
    let fixture = library();
    let app = router(&fixture);

    for range in ["bytes=-500", "bytes=0-10,20-30", "items=0-10", "bytes=abc-"] {
        let response = get(app.clone(), "/media/tracks/7/stream", Some(range)).await;
        assert_eq!(
            response.status(),
            StatusCode::RANGE_NOT_SATISFIABLE,
            "range {range:?}"
        );
    }
}

#[tokio::test]
async fn test_head_returns_headers_only() {
    let fixture = library();
    let request = Request::head("/media/tracks/7/stream?quality=flac")
        .header(header::RANGE, "bytes=0-9")
        .body(Body::empty())
        .unwrap();
    let response = router(&fixture).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        format!("bytes 0-9/{TRACK_LEN}")
    );
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_mixed_case_range_unit() {
    let fixture = library();
    let response = get(router(&fixture), "/media/tracks/7/stream", Some("Bytes=0-9")).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(body_bytes(response).await, pattern_bytes(10));
}

#[tokio::test]
async fn test_legacy_alias_route() {
    let fixture = library();
    let response = get(
        router(&fixture),
        "/api/music/stream/8",
        Some("bytes=2000-"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2000-2047/2048");
    assert_eq!(body_bytes(response).await, pattern_bytes(2048)[2000..]);
}

#[tokio::test]
async fn test_invalid_quality_rejected() {
    let fixture = library();
    let response = get(router(&fixture), "/media/tracks/7/stream?quality=mp3", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Invalid quality" }));
}

#[tokio::test]
async fn test_non_numeric_track_id() {
    let fixture = library();
    let response = get(router(&fixture), "/media/tracks/abc/stream", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Track not found" }));
}

#[tokio::test]
async fn test_missing_catalog_is_server_error() {
    let fixture = MediaFixture::new().with_file("flac/a.flac", 10);
    let response = get(router(&fixture), "/media/tracks/1/stream", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Catalog unavailable" })
    );
}

#[tokio::test]
async fn test_health() {
    let fixture = library();
    let response = get(router(&fixture), "/api/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response).await;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["tracks"], 3);
}
