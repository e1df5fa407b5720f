//! Materialized extent store
//!
//! Wraps the filesystem state of tile extracts inside the working
//! directory. Every tile maps to a deterministic `{z}_{x}_{y}.pbf` path;
//! the store answers the existence/size/mtime questions the scheduler
//! needs to decide whether a tile must be (re)generated.
//!
//! The store never creates or deletes files itself. Extraction writes
//! through the [`Extractor`](crate::extract::Extractor), hand-off copies
//! through the [`CompletionSink`](crate::sink::CompletionSink).

use crate::tile::Tile;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// File extension of materialized extracts.
pub const EXTRACT_EXTENSION: &str = "pbf";

/// Errors that can occur while inspecting extent state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The extent file does not exist.
    #[error("Extent not found: {path}")]
    NotFound {
        /// Path that was probed
        path: PathBuf,
    },

    /// Filesystem metadata could not be read.
    ///
    /// Covers the TOCTOU case where a file disappears between an
    /// existence check and a stat call.
    #[error("Failed to stat {path}: {source}")]
    Io {
        /// Path that was probed
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

/// Filesystem view of materialized tile extents in a working directory.
///
/// Cheap to clone; holds only the directory path. Two stores over the
/// same directory are interchangeable.
#[derive(Debug, Clone)]
pub struct ExtentStore {
    working_dir: PathBuf,
}

impl ExtentStore {
    /// Creates a store rooted at the given working directory.
    ///
    /// The directory is not created or validated here; callers ensure it
    /// exists before scheduling starts.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Returns the working directory this store is rooted at.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Returns the deterministic path for a tile's extent.
    ///
    /// Derived solely from `(z, x, y)`; two calls for the same tile always
    /// yield the same path.
    pub fn path(&self, tile: Tile) -> PathBuf {
        self.working_dir
            .join(format!("{}.{}", tile.file_stem(), EXTRACT_EXTENSION))
    }

    /// Returns whether the tile's extent exists on disk.
    pub fn exists(&self, tile: Tile) -> bool {
        self.path(tile).is_file()
    }

    /// Returns the size in bytes of the tile's extent.
    pub fn size_bytes(&self, tile: Tile) -> Result<u64, StoreError> {
        self.metadata(tile).map(|m| m.len())
    }

    /// Returns the last-modified timestamp of the tile's extent.
    pub fn modified(&self, tile: Tile) -> Result<SystemTime, StoreError> {
        let path = self.path(tile);
        self.metadata(tile)?
            .modified()
            .map_err(|source| StoreError::Io { path, source })
    }

    /// Returns whether the tile's extent needs (re)generation.
    ///
    /// An extent is stale if it does not exist, or if its mtime precedes
    /// its parent's (the parent was regenerated since this extent was
    /// produced). Assumes a single local filesystem with monotonic mtimes.
    pub fn is_stale(&self, tile: Tile, parent: Tile) -> Result<bool, StoreError> {
        if !self.exists(tile) {
            return Ok(true);
        }
        Ok(self.modified(tile)? < self.modified(parent)?)
    }

    fn metadata(&self, tile: Tile) -> Result<std::fs::Metadata, StoreError> {
        let path = self.path(tile);
        std::fs::metadata(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound { path }
            } else {
                StoreError::Io { path, source }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_extent(store: &ExtentStore, tile: Tile, bytes: &[u8]) {
        fs::write(store.path(tile), bytes).unwrap();
    }

    #[test]
    fn test_path_is_deterministic() {
        let store = ExtentStore::new("/tmp/extracts");
        let tile = Tile::new(3, 4, 5).unwrap();
        assert_eq!(store.path(tile), store.path(tile));
        assert!(store.path(tile).ends_with("3_4_5.pbf"));
    }

    #[test]
    fn test_exists_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let tile = Tile::new(1, 0, 0).unwrap();

        assert!(!store.exists(tile));
        assert!(matches!(
            store.size_bytes(tile),
            Err(StoreError::NotFound { .. })
        ));

        write_extent(&store, tile, b"hello");
        assert!(store.exists(tile));
        assert_eq!(store.size_bytes(tile).unwrap(), 5);
    }

    #[test]
    fn test_missing_extent_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let parent = Tile::ROOT;
        let child = parent.children()[0];

        write_extent(&store, parent, b"planet");
        assert!(store.is_stale(child, parent).unwrap());
    }

    #[test]
    fn test_extent_newer_than_parent_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let parent = Tile::ROOT;
        let child = parent.children()[0];

        write_extent(&store, parent, b"planet");
        write_extent(&store, child, b"quadrant");
        assert!(!store.is_stale(child, parent).unwrap());
    }

    #[test]
    fn test_extent_older_than_parent_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let parent = Tile::ROOT;
        let child = parent.children()[0];

        write_extent(&store, child, b"quadrant");
        // Push the parent's mtime past the child's without sleeping.
        write_extent(&store, parent, b"planet");
        let future = SystemTime::now() + std::time::Duration::from_secs(60);
        let file = fs::OpenOptions::new()
            .write(true)
            .open(store.path(parent))
            .unwrap();
        file.set_modified(future).unwrap();

        assert!(store.is_stale(child, parent).unwrap());
    }
}
