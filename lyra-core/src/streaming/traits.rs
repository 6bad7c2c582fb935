//! Core abstraction for the streaming pipeline.
//!
//! The responder only knows a byte length and how to read forward from an
//! offset. It has no knowledge of tracks, tiers or catalogs.

use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Forward-only reader over a single media file.
pub type MediaReader = Box<dyn AsyncRead + Send + Unpin>;

/// Provides sequential read access to one piece of media.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Total length of the media in bytes.
    fn len(&self) -> u64;

    /// Whether the media has no bytes at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens a reader positioned at `offset`.
    ///
    /// The returned reader is owned by a single response and is dropped,
    /// releasing any underlying handle, when that response ends.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` - The media could not be opened or positioned
    async fn open_at(&self, offset: u64) -> std::io::Result<MediaReader>;
}
