//! Track catalog model and its external JSON source
//!
//! The catalog is a flat listing maintained outside the server. It is loaded
//! through a [`CatalogSource`] on every request so edits show up immediately.
//! Raw entries come in two schemas (a `files` map per tier, or a legacy single
//! `filename`) and are normalized into [`TrackFiles`] once, at load time.

pub mod quality;
pub mod resolver;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
pub use quality::{Quality, QualityFallback, UnknownQuality};
pub use resolver::{CatalogResolver, FileLocation, ResolveError, content_type_for_path};
use serde::Deserialize;
use tracing::{debug, warn};

/// Errors raised while loading the catalog listing.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Listing could not be read from disk
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Path of the listing
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Listing is not a valid JSON array of track entries
    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        /// Path of the listing
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// File mapping of a track, normalized from either catalog schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackFiles {
    /// One filename per quality tier
    Tiered(BTreeMap<Quality, String>),
    /// Single filename with no tier distinction
    Legacy(String),
}

impl TrackFiles {
    /// Picks the filename to serve for `requested`.
    ///
    /// Tiered entries walk the fallback policy and report the tier that
    /// actually supplied the filename. Legacy entries ignore the tier and
    /// report the requested one.
    pub fn select(&self, requested: Quality) -> Option<(Quality, &str)> {
        match self {
            TrackFiles::Tiered(files) => requested.fallback().into_iter().find_map(|quality| {
                files
                    .get(&quality)
                    .map(|filename| (quality, filename.as_str()))
            }),
            TrackFiles::Legacy(filename) => Some((requested, filename.as_str())),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub artist: String,
    /// Cover image filename, served by the surrounding web layer
    pub cover: Option<String>,
    pub files: TrackFiles,
}

/// Entry as it appears in the JSON listing.
#[derive(Debug, Deserialize)]
struct RawTrack {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    files: Option<HashMap<String, String>>,
    #[serde(default)]
    filename: Option<String>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let id = raw.id;
        let files = match (raw.files, raw.filename) {
            (Some(files), _) => TrackFiles::Tiered(
                files
                    .into_iter()
                    .filter(|(_, filename)| !filename.is_empty())
                    .filter_map(|(tier, filename)| match tier.parse::<Quality>() {
                        Ok(quality) => Some((quality, filename)),
                        Err(_) => {
                            debug!("Ignoring unknown tier {tier} on track {id}");
                            None
                        }
                    })
                    .collect(),
            ),
            (None, Some(filename)) if !filename.is_empty() => TrackFiles::Legacy(filename),
            (None, _) => TrackFiles::Tiered(BTreeMap::new()),
        };

        Track {
            id,
            title: raw.title,
            artist: raw.artist,
            cover: raw.cover,
            files,
        }
    }
}

/// Immutable snapshot of the listing for the lifetime of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Creates a catalog from already normalized tracks.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Parses a JSON array of raw track entries.
    ///
    /// # Errors
    ///
    /// - `serde_json::Error` - Input is not an array of track entries
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawTrack> = serde_json::from_slice(bytes)?;

        let mut seen = HashSet::new();
        for entry in &raw {
            if !seen.insert(entry.id) {
                warn!("Duplicate track id {} in catalog, first entry wins", entry.id);
            }
        }

        Ok(Self::new(raw.into_iter().map(Track::from).collect()))
    }

    /// Finds the first track with the given id.
    pub fn find(&self, id: u64) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Source of the track listing.
///
/// Implementations must return the current state of the listing on every
/// call; callers never cache the result across requests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads a fresh snapshot of the catalog.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Io` - Listing could not be read
    /// - `CatalogError::Parse` - Listing is malformed
    async fn load(&self) -> CatalogResult<Catalog>;
}

/// Catalog backed by a JSON file that is re-read on every load.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn load(&self) -> CatalogResult<Catalog> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;

        Catalog::from_json(&bytes).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_normalizes_both_schemas() {
        let catalog = Catalog::from_json(
            br#"[
                {"id": 1, "title": "A", "artist": "X", "cover": "a.jpg",
                 "files": {"flac": "a.flac", "ogg": "a.ogg", "opus": "a.opus"}},
                {"id": 2, "title": "B", "artist": "Y", "filename": "b.mp3"},
                {"id": 3, "title": "C", "artist": "Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);

        let tiered = catalog.find(1).unwrap();
        let expected: BTreeMap<_, _> = [
            (Quality::Flac, "a.flac".to_string()),
            (Quality::Ogg, "a.ogg".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(tiered.files, TrackFiles::Tiered(expected));
        assert_eq!(tiered.cover.as_deref(), Some("a.jpg"));

        assert_eq!(
            catalog.find(2).unwrap().files,
            TrackFiles::Legacy("b.mp3".to_string())
        );
        assert_eq!(
            catalog.find(3).unwrap().files,
            TrackFiles::Tiered(BTreeMap::new())
        );
        assert!(catalog.find(4).is_none());
    }

    #[test]
    fn test_select_follows_fallback_policy() {
        let files = TrackFiles::Tiered([(Quality::Flac, "a.flac".to_string())].into());
        assert_eq!(files.select(Quality::Ogg), Some((Quality::Flac, "a.flac")));
        assert_eq!(files.select(Quality::Flac), Some((Quality::Flac, "a.flac")));

        let files = TrackFiles::Tiered([(Quality::Ogg, "a.ogg".to_string())].into());
        assert_eq!(files.select(Quality::Flac), Some((Quality::Ogg, "a.ogg")));

        let files = TrackFiles::Tiered(BTreeMap::new());
        assert_eq!(files.select(Quality::Flac), None);
    }

    #[test]
    fn test_select_legacy_ignores_quality() {
        let files = TrackFiles::Legacy("old.mp3".to_string());
        assert_eq!(files.select(Quality::Ogg), Some((Quality::Ogg, "old.mp3")));
    }

    #[test]
    fn test_empty_filenames_are_ignored() {
        let catalog =
            Catalog::from_json(br#"[{"id": 5, "files": {"ogg": "", "flac": "e.flac"}}]"#).unwrap();
        assert_eq!(
            catalog.find(5).unwrap().files.select(Quality::Ogg),
            Some((Quality::Flac, "e.flac"))
        );
    }

    #[test]
    fn test_duplicate_ids_first_wins() {
        let catalog = Catalog::from_json(
            br#"[{"id": 1, "filename": "first.mp3"}, {"id": 1, "filename": "second.mp3"}]"#,
        )
        .unwrap();
        assert_eq!(
            catalog.find(1).unwrap().files,
            TrackFiles::Legacy("first.mp3".to_string())
        );
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(Catalog::from_json(br#"{"id": 1}"#).is_err());
    }

    #[tokio::test]
    async fn test_json_file_catalog_rereads_on_every_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.json");
        tokio::fs::write(&path, br#"[{"id": 1, "filename": "a.mp3"}]"#)
            .await
            .unwrap();

        let source = JsonFileCatalog::new(&path);
        assert_eq!(source.load().await.unwrap().len(), 1);

        tokio::fs::write(
            &path,
            br#"[{"id": 1, "filename": "a.mp3"}, {"id": 2, "filename": "b.mp3"}]"#,
        )
        .await
        .unwrap();
        assert_eq!(source.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_json_file_catalog_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = JsonFileCatalog::new(dir.path().join("missing.json"));
        assert!(matches!(
            missing.load().await,
            Err(CatalogError::Io { .. })
        ));

        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        assert!(matches!(
            JsonFileCatalog::new(&path).load().await,
            Err(CatalogError::Parse { .. })
        ));
    }
}
