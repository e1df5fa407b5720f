//! Completion sink
//!
//! Terminal tiles (extents at or below target size, or at the zoom
//! ceiling) are handed off here for downstream finishing. The production
//! sink copies the extract into the output directory and optionally
//! registers it with the remote [`Catalog`]; the null sink discards the
//! hand-off for dry runs and tests.
//!
//! Sink failures are reported to the scheduler but never abort the run:
//! the extract stays in the working directory, so a rerun retries the
//! hand-off without re-extracting.

use crate::catalog::Catalog;
use crate::tile::Tile;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors reported by terminal-tile hand-off.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Copying the extract into the output directory failed.
    #[error("Failed to copy {path} to output directory: {source}")]
    Copy {
        /// Source extract path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Registering the extract with the catalog failed.
    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),
}

/// Boxed future returned by [`CompletionSink::on_terminal_tile`].
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Receives each terminal tile's path for downstream finishing.
///
/// Invoked once per terminal tile. Implementations may perform network
/// I/O but must not block the scheduler's workers indefinitely; slow
/// work belongs behind the implementation's own bounded concurrency.
pub trait CompletionSink: Send + Sync + 'static {
    /// Called when `tile`'s extent at `path` has reached terminal state.
    fn on_terminal_tile<'a>(&'a self, tile: Tile, path: &'a Path) -> SinkFuture<'a>;
}

/// Sink that discards terminal tiles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CompletionSink for NullSink {
    fn on_terminal_tile<'a>(&'a self, tile: Tile, _path: &'a Path) -> SinkFuture<'a> {
        Box::pin(async move {
            debug!(%tile, "discarding terminal tile (null sink)");
            Ok(())
        })
    }
}

/// Sink that copies terminal extracts into an output directory.
///
/// The copy keeps the `{z}_{x}_{y}.pbf` naming scheme. When a catalog
/// client is attached, the extract is uploaded after the local copy
/// succeeds, so a registered dump always has a matching local file.
pub struct OutputDirSink {
    output_dir: PathBuf,
    catalog: Option<Arc<dyn Catalog>>,
}

impl OutputDirSink {
    /// Creates a sink writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            catalog: None,
        }
    }

    /// Attaches a catalog client; terminal tiles are uploaded after the
    /// local copy (builder pattern).
    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl CompletionSink for OutputDirSink {
    fn on_terminal_tile<'a>(&'a self, tile: Tile, path: &'a Path) -> SinkFuture<'a> {
        Box::pin(async move {
            let file_name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("{}.pbf", tile.file_stem())));
            let target = self.output_dir.join(file_name);

            tokio::fs::copy(path, &target)
                .await
                .map_err(|source| SinkError::Copy {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!(%tile, target = %target.display(), "terminal tile copied to output");

            if let Some(catalog) = &self.catalog {
                catalog.upload_dump(tile, path).await?;
                info!(%tile, "terminal tile registered with catalog");
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_null_sink_always_succeeds() {
        let sink = NullSink;
        let result = sink
            .on_terminal_tile(Tile::ROOT, Path::new("/nowhere/0_0_0.pbf"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_output_dir_sink_copies_with_same_name() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let tile = Tile::new(1, 1, 0).unwrap();

        let source = work.path().join("1_1_0.pbf");
        fs::write(&source, b"extract-bytes").unwrap();

        let sink = OutputDirSink::new(out.path());
        sink.on_terminal_tile(tile, &source).await.unwrap();

        let copied = fs::read(out.path().join("1_1_0.pbf")).unwrap();
        assert_eq!(copied, b"extract-bytes");
        // Source stays in place for idempotent reruns.
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_output_dir_sink_reports_copy_failure() {
        let out = tempfile::tempdir().unwrap();
        let sink = OutputDirSink::new(out.path());
        let result = sink
            .on_terminal_tile(Tile::ROOT, Path::new("/nowhere/0_0_0.pbf"))
            .await;
        assert!(matches!(result, Err(SinkError::Copy { .. })));
    }
}
