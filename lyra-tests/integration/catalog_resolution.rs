//! Resolver behaviour against real files on disk.

use lyra_core::test_fixtures::MediaFixture;
use lyra_core::{Quality, ResolveError};

#[tokio::test]
async fn test_resolved_length_matches_file_size() {
    let fixture = MediaFixture::new()
        .with_catalog(
            r#"[
                {"id": 1, "title": "One", "files": {"flac": "one.flac", "ogg": "one.ogg"}},
                {"id": 2, "title": "Two", "filename": "two.mp3"}
            ]"#,
        )
        .with_file("flac/one.flac", 4096)
        .with_file("ogg/one.ogg", 1024)
        .with_file("two.mp3", 777);
    let resolver = fixture.resolver();

    for (track_id, quality) in [(1, Quality::Flac), (1, Quality::Ogg), (2, Quality::Flac)] {
        let location = resolver.resolve(track_id, quality).await.unwrap();
        let on_disk = std::fs::metadata(&location.path).unwrap().len();
        assert_eq!(location.len, on_disk, "track {track_id} ({quality})");
    }
}

#[tokio::test]
async fn test_catalog_edits_visible_without_restart() {
    let fixture = MediaFixture::new()
        .with_catalog("[]")
        .with_file("flac/new.flac", 10);
    let resolver = fixture.resolver();

    assert!(matches!(
        resolver.resolve(3, Quality::Flac).await,
        Err(ResolveError::TrackNotFound { track_id: 3 })
    ));

    std::fs::write(
        fixture.catalog_path(),
        r#"[{"id": 3, "files": {"flac": "new.flac"}}]"#,
    )
    .unwrap();

    let location = resolver.resolve(3, Quality::Flac).await.unwrap();
    assert_eq!(location.len, 10);
    assert_eq!(location.content_type, "audio/flac");
}

#[tokio::test]
async fn test_legacy_entry_prefers_tier_folder() {
    let fixture = MediaFixture::new()
        .with_catalog(r#"[{"id": 4, "filename": "song.ogg"}]"#)
        .with_file("ogg/song.ogg", 20)
        .with_file("song.ogg", 30);
    let resolver = fixture.resolver();

    let tiered = resolver.resolve(4, Quality::Ogg).await.unwrap();
    assert_eq!(tiered.path, fixture.root().join("ogg").join("song.ogg"));
    assert_eq!(tiered.len, 20);

    let flat = resolver.resolve(4, Quality::Flac).await.unwrap();
    assert_eq!(flat.path, fixture.root().join("song.ogg"));
    assert_eq!(flat.len, 30);
}
