//! Maps a track id and quality tier to a file on disk
//!
//! Resolution order for a track whose filename was supplied by tier `t`
//! when tier `q` was requested: `<root>/<t>/<filename>`, then
//! `<root>/<q>/<filename>` if `q` differs, then the flat legacy layout
//! `<root>/<filename>`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{CatalogError, CatalogSource, Quality};

/// Fallback content type for unknown extensions.
const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

/// Errors produced while resolving a track to a file.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No catalog entry has the requested id
    #[error("Track {track_id} not found in catalog")]
    TrackNotFound {
        /// Requested track id
        track_id: u64,
    },

    /// Entry exists but maps no filename for any tier
    #[error("Track {track_id} has no file for quality {quality}")]
    QualityUnavailable {
        /// Requested track id
        track_id: u64,
        /// Requested tier
        quality: Quality,
    },

    /// None of the candidate paths exists on disk
    #[error("Music file for track {track_id} not found (tried {candidates:?})")]
    FileNotFound {
        /// Requested track id
        track_id: u64,
        /// Paths checked, in order
        candidates: Vec<PathBuf>,
    },

    /// Catalog listing could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Filesystem error other than a missing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Message returned to HTTP clients.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::TrackNotFound { .. } => "Track not found",
            ResolveError::QualityUnavailable { .. } => "Quality not available",
            ResolveError::FileNotFound { .. } => "Music file not found",
            ResolveError::Catalog(_) => "Catalog unavailable",
            ResolveError::Io(_) => "Failed to read music file",
        }
    }

    /// Whether this error means the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::TrackNotFound { .. }
                | ResolveError::QualityUnavailable { .. }
                | ResolveError::FileNotFound { .. }
        )
    }
}

/// A resolved, existing file ready to be streamed.
///
/// Computed per request and never shared between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub path: PathBuf,
    /// Byte length at the time of the stat
    pub len: u64,
    pub content_type: &'static str,
    /// Tier the filename was taken from
    pub quality: Quality,
}

/// Returns the MIME type for a file based on its extension.
///
/// ```
/// use lyra_core::catalog::content_type_for_path;
///
/// assert_eq!(content_type_for_path("song.FLAC".as_ref()), "audio/flac");
/// assert_eq!(content_type_for_path("song.aac".as_ref()), "audio/mpeg");
/// ```
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Stateless resolver over a catalog source and a media root.
#[derive(Clone)]
pub struct CatalogResolver {
    source: Arc<dyn CatalogSource>,
    media_root: PathBuf,
}

impl CatalogResolver {
    pub fn new(source: Arc<dyn CatalogSource>, media_root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    pub fn source(&self) -> &Arc<dyn CatalogSource> {
        &self.source
    }

    /// Resolves `track_id` at `quality` to an existing file.
    ///
    /// Loads a fresh catalog snapshot on every call.
    ///
    /// # Errors
    ///
    /// - `ResolveError::TrackNotFound` - No entry with this id
    /// - `ResolveError::QualityUnavailable` - Entry maps no filename
    /// - `ResolveError::FileNotFound` - No candidate path exists
    /// - `ResolveError::Catalog` - Listing could not be loaded
    /// - `ResolveError::Io` - Stat failed for a reason other than absence
    pub async fn resolve(
        &self,
        track_id: u64,
        quality: Quality,
    ) -> Result<FileLocation, ResolveError> {
        let catalog = self.source.load().await?;

        let track = catalog
            .find(track_id)
            .ok_or(ResolveError::TrackNotFound { track_id })?;

        let (tier, filename) = track
            .files
            .select(quality)
            .ok_or(ResolveError::QualityUnavailable { track_id, quality })?;

        let mut candidates = vec![self.media_root.join(tier.as_str()).join(filename)];
        if tier != quality {
            candidates.push(self.media_root.join(quality.as_str()).join(filename));
        }
        candidates.push(self.media_root.join(filename));

        for candidate in &candidates {
            if let Some(len) = regular_file_len(candidate).await? {
                debug!(
                    "Resolved track {} ({}) to {} ({} bytes)",
                    track_id,
                    quality,
                    candidate.display(),
                    len
                );
                return Ok(FileLocation {
                    content_type: content_type_for_path(candidate),
                    path: candidate.clone(),
                    len,
                    quality: tier,
                });
            }
        }

        warn!(
            "Music file not found for track {}: tried {:?}",
            track_id, candidates
        );
        Err(ResolveError::FileNotFound {
            track_id,
            candidates,
        })
    }
}

/// Length of `path` if it exists and is a regular file.
async fn regular_file_len(path: &Path) -> Result<Option<u64>, std::io::Error> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        // A path component that is a file rather than a directory
        Err(e) if e.kind() == std::io::ErrorKind::NotADirectory => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::MediaFixture;

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for_path(Path::new("a.flac")), "audio/flac");
        assert_eq!(content_type_for_path(Path::new("a.ogg")), "audio/ogg");
        assert_eq!(content_type_for_path(Path::new("a.mp3")), "audio/mpeg");
        assert_eq!(content_type_for_path(Path::new("a.WAV")), "audio/wav");
        assert_eq!(content_type_for_path(Path::new("a.opus")), "audio/mpeg");
        assert_eq!(content_type_for_path(Path::new("noext")), "audio/mpeg");
    }

    #[tokio::test]
    async fn test_resolve_tiered_file() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 1, "files": {"flac": "a.flac", "ogg": "a.ogg"}}]"#)
            .with_file("flac/a.flac", 1000)
            .with_file("ogg/a.ogg", 300);
        let resolver = fixture.resolver();

        let flac = resolver.resolve(1, Quality::Flac).await.unwrap();
        assert_eq!(flac.path, fixture.root().join("flac/a.flac"));
        assert_eq!(flac.len, 1000);
        assert_eq!(flac.content_type, "audio/flac");

        let ogg = resolver.resolve(1, Quality::Ogg).await.unwrap();
        assert_eq!(ogg.path, fixture.root().join("ogg/a.ogg"));
        assert_eq!(ogg.len, 300);
        assert_eq!(ogg.content_type, "audio/ogg");
        assert_eq!(ogg.quality, Quality::Ogg);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_flac_tier() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 7, "files": {"flac": "a.flac"}}]"#)
            .with_file("flac/a.flac", 4096);

        let location = fixture.resolver().resolve(7, Quality::Ogg).await.unwrap();
        assert_eq!(location.path, fixture.root().join("flac/a.flac"));
        assert_eq!(location.quality, Quality::Flac);
        assert_eq!(location.len, 4096);
    }

    #[tokio::test]
    async fn test_resolve_fallback_file_in_requested_tier_folder() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 7, "files": {"flac": "a.flac"}}]"#)
            .with_file("ogg/a.flac", 2048);

        let location = fixture.resolver().resolve(7, Quality::Ogg).await.unwrap();
        assert_eq!(location.path, fixture.root().join("ogg/a.flac"));
        assert_eq!(location.len, 2048);
        assert_eq!(location.content_type, "audio/flac");
    }

    #[tokio::test]
    async fn test_resolve_fallback_candidate_order() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 7, "files": {"flac": "a.flac"}}]"#);

        let err = fixture.resolver().resolve(7, Quality::Ogg).await.unwrap_err();
        match err {
            ResolveError::FileNotFound { candidates, .. } => assert_eq!(
                candidates,
                vec![
                    fixture.root().join("flac/a.flac"),
                    fixture.root().join("ogg/a.flac"),
                    fixture.root().join("a.flac"),
                ]
            ),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_flat_layout_fallback() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 2, "filename": "old.mp3"}]"#)
            .with_file("old.mp3", 512);

        let location = fixture.resolver().resolve(2, Quality::Ogg).await.unwrap();
        assert_eq!(location.path, fixture.root().join("old.mp3"));
        assert_eq!(location.content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_resolve_legacy_entry_uses_requested_tier_folder() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 2, "filename": "old.ogg"}]"#)
            .with_file("ogg/old.ogg", 64)
            .with_file("old.ogg", 32);

        let location = fixture.resolver().resolve(2, Quality::Ogg).await.unwrap();
        assert_eq!(location.path, fixture.root().join("ogg/old.ogg"));
        assert_eq!(location.len, 64);
    }

    #[tokio::test]
    async fn test_resolve_not_found_reasons() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 1, "files": {}}, {"id": 3, "files": {"flac": "gone.flac"}}]"#);
        let resolver = fixture.resolver();

        let err = resolver.resolve(9, Quality::Flac).await.unwrap_err();
        assert!(matches!(err, ResolveError::TrackNotFound { track_id: 9 }));
        assert_eq!(err.user_message(), "Track not found");

        let err = resolver.resolve(1, Quality::Flac).await.unwrap_err();
        assert!(matches!(err, ResolveError::QualityUnavailable { .. }));
        assert_eq!(err.user_message(), "Quality not available");

        let err = resolver.resolve(3, Quality::Flac).await.unwrap_err();
        match &err {
            ResolveError::FileNotFound { candidates, .. } => {
                assert_eq!(
                    candidates,
                    &vec![
                        fixture.root().join("flac/gone.flac"),
                        fixture.root().join("gone.flac")
                    ]
                );
            }
            other => panic!("Expected FileNotFound, got {other:?}"),
        }
        assert_eq!(err.user_message(), "Music file not found");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let fixture = MediaFixture::new()
            .with_catalog(r#"[{"id": 1, "filename": "album"}]"#)
            .with_dir("album");

        let err = fixture.resolver().resolve(1, Quality::Flac).await.unwrap_err();
        assert!(matches!(err, ResolveError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_catalog_is_catalog_error() {
        let fixture = MediaFixture::new();
        let err = fixture.resolver().resolve(1, Quality::Flac).await.unwrap_err();
        assert!(matches!(err, ResolveError::Catalog(CatalogError::Io { .. })));
        assert!(!err.is_not_found());
    }
}
