//! `osmconvert` subprocess extractor.

use super::{ExtractError, ExtractFuture, Extractor};
use crate::tile::BoundingBox;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Default executable name, resolved through `PATH`.
pub const DEFAULT_OSMCONVERT_BIN: &str = "osmconvert";

/// [`Extractor`] implementation that shells out to `osmconvert`.
///
/// Invocation shape:
///
/// ```text
/// osmconvert -b=<west>,<south>,<east>,<north> -o=<output> \
///     --complete-ways --complex-ways --out-pbf <parent>
/// ```
///
/// `--complete-ways`/`--complex-ways` keep ways and relations that cross
/// the bounding box intact, so child extracts remain valid inputs for
/// further splitting.
#[derive(Debug, Clone)]
pub struct OsmConvertExtractor {
    binary: String,
}

impl Default for OsmConvertExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl OsmConvertExtractor {
    /// Creates an extractor using the `osmconvert` binary from `PATH`.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_OSMCONVERT_BIN)
    }

    /// Creates an extractor using a specific binary path.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Extractor for OsmConvertExtractor {
    fn materialize<'a>(
        &'a self,
        parent: &'a Path,
        bounds: BoundingBox,
        output: &'a Path,
    ) -> ExtractFuture<'a> {
        Box::pin(async move {
            let mut command = Command::new(&self.binary);
            command
                .arg(format!("-b={}", bounds))
                .arg(format!("-o={}", output.display()))
                .arg("--complete-ways")
                .arg("--complex-ways")
                .arg("--out-pbf")
                .arg(parent)
                // Abort the conversion if the scheduler drops us mid-run.
                .kill_on_drop(true);

            debug!(?command, "running osmconvert");

            let result = command.output().await?;
            if !result.status.success() {
                return Err(ExtractError::Failed {
                    status: result.status,
                    stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    #[tokio::test]
    async fn test_missing_binary_reports_spawn_error() {
        let extractor = OsmConvertExtractor::with_binary("osmconvert-does-not-exist");
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("0_0_0.pbf");
        let output = dir.path().join("1_0_0.pbf");

        let result = extractor
            .materialize(&parent, Tile::ROOT.bounds(), &output)
            .await;

        assert!(matches!(result, Err(ExtractError::Spawn(_))));
    }

    #[tokio::test]
    async fn test_failing_process_reports_exit_status() {
        // `false` ignores the arguments and exits non-zero.
        let extractor = OsmConvertExtractor::with_binary("false");
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("0_0_0.pbf");
        let output = dir.path().join("1_0_0.pbf");

        let result = extractor
            .materialize(&parent, Tile::ROOT.bounds(), &output)
            .await;

        match result {
            Err(ExtractError::Failed { status, .. }) => assert!(!status.success()),
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
