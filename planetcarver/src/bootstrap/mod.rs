//! Working-directory bootstrap
//!
//! Before scheduling starts the working directory must hold the root
//! extent (`0_0_0.pbf`, the full planet dump). This module downloads the
//! dump and seeds the root path, skipping the download when the local copy
//! already matches the remote size.

use crate::store::ExtentStore;
use crate::tile::Tile;
use futures_util::StreamExt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// URL of the latest full planet dump.
pub const DEFAULT_PLANET_URL: &str = "https://planet.openstreetmap.org/pbf/planet-latest.osm.pbf";

/// Errors that can occur while bootstrapping the working directory.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The dump URL has no usable file name component.
    #[error("Cannot derive a file name from URL {0}")]
    InvalidUrl(String),

    /// Transport-level download failure.
    #[error("Download of {url} failed: {message}")]
    Download {
        /// Dump URL
        url: String,
        /// Transport error description
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("Download of {url} failed with HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Dump URL
        url: String,
    },

    /// Local filesystem failure.
    #[error("Bootstrap I/O failed at {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> BootstrapError {
    let path = path.to_path_buf();
    move |source| BootstrapError::Io { path, source }
}

/// Downloads the planet dump at `url` into `working_dir`.
///
/// Returns the local dump path. The download is skipped when a local file
/// of the same name already has the size the server reports; otherwise the
/// dump is streamed to a `.part` file and renamed into place, so an
/// interrupted download never masquerades as complete.
pub async fn download_planet_dump(url: &str, working_dir: &Path) -> Result<PathBuf, BootstrapError> {
    let file_name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BootstrapError::InvalidUrl(url.to_string()))?;
    let target = working_dir.join(file_name);

    let response = reqwest::get(url)
        .await
        .map_err(|e| BootstrapError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    if !response.status().is_success() {
        return Err(BootstrapError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let remote_len = response.content_length();
    if let (Some(remote_len), Ok(metadata)) = (remote_len, std::fs::metadata(&target)) {
        if metadata.len() == remote_len {
            info!(path = %target.display(), "planet dump already downloaded, skipping");
            return Ok(target);
        }
        debug!(
            local = metadata.len(),
            remote = remote_len,
            "local dump size differs, re-downloading"
        );
    }

    info!(url, path = %target.display(), "downloading planet dump");
    let part = target.with_extension("part");
    let mut file = tokio::fs::File::create(&part).await.map_err(io_err(&part))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| BootstrapError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        file.write_all(&chunk).await.map_err(io_err(&part))?;
    }
    file.flush().await.map_err(io_err(&part))?;
    drop(file);

    tokio::fs::rename(&part, &target)
        .await
        .map_err(io_err(&target))?;
    Ok(target)
}

/// Seeds the root extent from a downloaded dump.
///
/// Hard-links the dump to the store's root path, falling back to a copy
/// when linking fails (e.g. across filesystems). An existing root extent
/// is replaced, which leaves its mtime equal to the dump's and keeps the
/// staleness check meaningful across reruns.
pub async fn seed_root(store: &ExtentStore, dump: &Path) -> Result<PathBuf, BootstrapError> {
    let root_path = store.path(Tile::ROOT);
    if root_path == dump {
        return Ok(root_path);
    }

    if tokio::fs::try_exists(&root_path)
        .await
        .map_err(io_err(&root_path))?
    {
        tokio::fs::remove_file(&root_path)
            .await
            .map_err(io_err(&root_path))?;
    }

    match tokio::fs::hard_link(dump, &root_path).await {
        Ok(()) => debug!(root = %root_path.display(), "root extent hard-linked"),
        Err(e) => {
            debug!(error = %e, "hard link failed, copying dump instead");
            tokio::fs::copy(dump, &root_path)
                .await
                .map_err(io_err(&root_path))?;
        }
    }
    info!(root = %root_path.display(), "root extent seeded");
    Ok(root_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_root_links_dump_into_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let dump = dir.path().join("planet-latest.osm.pbf");
        tokio::fs::write(&dump, b"planet").await.unwrap();

        let root = seed_root(&store, &dump).await.unwrap();
        assert_eq!(root, store.path(Tile::ROOT));
        assert_eq!(tokio::fs::read(&root).await.unwrap(), b"planet");
    }

    #[tokio::test]
    async fn test_seed_root_replaces_existing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let dump = dir.path().join("planet-latest.osm.pbf");
        tokio::fs::write(&dump, b"new planet").await.unwrap();
        tokio::fs::write(store.path(Tile::ROOT), b"old planet")
            .await
            .unwrap();

        let root = seed_root(&store, &dump).await.unwrap();
        assert_eq!(tokio::fs::read(&root).await.unwrap(), b"new planet");
    }

    #[tokio::test]
    async fn test_seed_root_is_a_no_op_when_dump_is_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExtentStore::new(dir.path());
        let root_path = store.path(Tile::ROOT);
        tokio::fs::write(&root_path, b"planet").await.unwrap();

        let root = seed_root(&store, &root_path).await.unwrap();
        assert_eq!(root, root_path);
        assert_eq!(tokio::fs::read(&root).await.unwrap(), b"planet");
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        // The file-name check fires before any network I/O.
        let result = download_planet_dump("https://planet.example/", Path::new("/tmp")).await;
        assert!(matches!(result, Err(BootstrapError::InvalidUrl(_))));
    }
}
