//! Byte-window properties of the range responder over real files.

use axum::http::{StatusCode, header};
use lyra_core::test_fixtures::{MediaFixture, pattern_bytes};
use lyra_core::{Quality, RangeResponder};
use proptest::prelude::*;

const FILE_LEN: usize = 5000;

async fn fetch(fixture: &MediaFixture, range: Option<&str>) -> (StatusCode, Vec<u8>) {
    let location = fixture.resolver().resolve(1, Quality::Flac).await.unwrap();
    let response = RangeResponder::for_location(&location, 333)
        .respond(range)
        .await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn fixture() -> MediaFixture {
    MediaFixture::new()
        .with_catalog(r#"[{"id": 1, "files": {"flac": "a.flac"}}]"#)
        .with_file("flac/a.flac", FILE_LEN)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_window_crosses_chunk_boundaries() {
    let fixture = fixture();
    let (status, body) = fetch(&fixture, Some("bytes=300-1299")).await;

    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body, pattern_bytes(FILE_LEN)[300..1300]);
}

#[tokio::test]
async fn test_zero_length_file() {
    let fixture = MediaFixture::new()
        .with_catalog(r#"[{"id": 1, "files": {"flac": "a.flac"}}]"#)
        .with_file("flac/a.flac", 0);
    let location = fixture.resolver().resolve(1, Quality::Flac).await.unwrap();
    let responder = RangeResponder::for_location(&location, 64);

    let full = responder.respond(None).await;
    assert_eq!(full.status(), StatusCode::OK);
    assert_eq!(full.headers()[header::CONTENT_LENGTH], "0");

    let ranged = responder.respond(Some("bytes=0-")).await;
    assert_eq!(ranged.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(ranged.headers()[header::CONTENT_RANGE], "bytes */0");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_window_matches_file_slice(a in 0usize..FILE_LEN, b in 0usize..FILE_LEN) {
        let (start, end) = (a.min(b), a.max(b));
        let fixture = fixture();
        let header = format!("bytes={start}-{end}");
        let (status, body) = runtime().block_on(fetch(&fixture, Some(&header)));

        let expected = pattern_bytes(FILE_LEN);
        prop_assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        prop_assert_eq!(&body[..], &expected[start..=end]);
    }

    #[test]
    fn prop_open_range_reaches_end(start in 0usize..FILE_LEN) {
        let fixture = fixture();
        let header = format!("bytes={start}-");
        let (status, body) = runtime().block_on(fetch(&fixture, Some(&header)));

        prop_assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        prop_assert_eq!(body.len(), FILE_LEN - start);
        prop_assert_eq!(body.last().copied(), pattern_bytes(FILE_LEN).last().copied());
    }
}
