//! Test fixtures for catalog and streaming tests.
//!
//! Builds a throwaway media root with a catalog listing and audio files
//! filled with a deterministic byte pattern.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{CatalogResolver, JsonFileCatalog};

/// Deterministic file content of the given length.
///
/// Uses a prime modulus so windows at different offsets differ.
pub fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Temporary media tree with a `tracks.json` catalog at its root.
///
/// # Panics
///
/// Builder methods panic if the temporary tree cannot be written.
/// This is acceptable in test fixtures where failures indicate environment issues.
pub struct MediaFixture {
    dir: tempfile::TempDir,
}

impl MediaFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Root of the media tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the catalog listing.
    pub fn catalog_path(&self) -> PathBuf {
        self.root().join("tracks.json")
    }

    /// Writes the catalog listing.
    pub fn with_catalog(self, json: &str) -> Self {
        std::fs::write(self.catalog_path(), json).unwrap();
        self
    }

    /// Writes a file of `len` pattern bytes at `relative` under the root.
    pub fn with_file(self, relative: &str, len: usize) -> Self {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, pattern_bytes(len)).unwrap();
        self
    }

    /// Creates an empty directory at `relative` under the root.
    pub fn with_dir(self, relative: &str) -> Self {
        std::fs::create_dir_all(self.root().join(relative)).unwrap();
        self
    }

    /// Resolver reading this fixture's catalog and media tree.
    pub fn resolver(&self) -> CatalogResolver {
        CatalogResolver::new(
            Arc::new(JsonFileCatalog::new(self.catalog_path())),
            self.root(),
        )
    }
}

impl Default for MediaFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_writes_tree() {
        let fixture = MediaFixture::new()
            .with_catalog("[]")
            .with_file("flac/a.flac", 10);

        assert!(fixture.catalog_path().is_file());
        assert_eq!(
            std::fs::read(fixture.root().join("flac/a.flac")).unwrap(),
            pattern_bytes(10)
        );
    }
}
