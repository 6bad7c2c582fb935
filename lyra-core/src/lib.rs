//! Lyra Core - Catalog resolution and byte-range streaming
//!
//! This crate provides the building blocks for serving a personal audio
//! library over HTTP: the catalog model and resolver that map a track and
//! quality tier to a file on disk, the range responder that turns a file and
//! an optional `Range` header into a correctly framed response, and the
//! configuration and tracing setup shared by the server and CLI.

pub mod catalog;
pub mod config;
pub mod streaming;
pub mod tracing_setup;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

// Re-export main types for convenient access
pub use catalog::{
    Catalog, CatalogError, CatalogResolver, CatalogSource, FileLocation, JsonFileCatalog, Quality,
    ResolveError, Track, TrackFiles,
};
pub use config::LyraConfig;
pub use streaming::{ByteRange, LocalFileSource, MediaSource, RangeError, RangeResponder};

/// Errors surfaced by Lyra operations outside the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum LyraError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

impl LyraError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            LyraError::Resolve(e) => e.user_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LyraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_not_found() {
        let error = LyraError::from(ResolveError::TrackNotFound { track_id: 9 });
        assert_eq!(error.user_message(), "Track not found");
    }

    #[test]
    fn test_user_message_for_catalog_failure() {
        let error = LyraError::from(ResolveError::Catalog(CatalogError::Io {
            path: "tracks.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }));
        assert_eq!(error.user_message(), "Catalog unavailable");
    }
}
