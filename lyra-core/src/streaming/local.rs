//! MediaSource implementation for files on the local filesystem

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncSeekExt;
use tracing::debug;

use super::traits::{MediaReader, MediaSource};
use crate::catalog::FileLocation;

/// A regular file whose length was taken at resolve time.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
    len: u64,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>, len: u64) -> Self {
        Self {
            path: path.into(),
            len,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<&FileLocation> for LocalFileSource {
    fn from(location: &FileLocation) -> Self {
        Self::new(location.path.clone(), location.len)
    }
}

#[async_trait]
impl MediaSource for LocalFileSource {
    fn len(&self) -> u64 {
        self.len
    }

    async fn open_at(&self, offset: u64) -> std::io::Result<MediaReader> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        debug!("Opened {} at offset {}", self.path.display(), offset);
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::test_fixtures::{MediaFixture, pattern_bytes};

    #[tokio::test]
    async fn test_open_at_offset() {
        let fixture = MediaFixture::new().with_file("a.flac", 1000);
        let source = LocalFileSource::new(fixture.root().join("a.flac"), 1000);

        let mut reader = source.open_at(600).await.unwrap();
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();

        assert_eq!(rest, pattern_bytes(1000)[600..]);
        assert_eq!(source.len(), 1000);
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let fixture = MediaFixture::new();
        let source = LocalFileSource::new(fixture.root().join("gone.flac"), 10);
        assert!(source.open_at(0).await.is_err());
    }
}
