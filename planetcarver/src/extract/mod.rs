//! Extraction collaborator
//!
//! The [`Extractor`] trait is the seam between the scheduler and the
//! external tool that actually carves a bounding box out of a parent
//! extract. The production implementation ([`OsmConvertExtractor`]) shells
//! out to `osmconvert`; tests substitute scripted implementations.

mod osmconvert;

pub use osmconvert::OsmConvertExtractor;

use crate::tile::BoundingBox;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors reported by extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extraction process could not be started.
    #[error("Failed to launch extractor: {0}")]
    Spawn(#[from] io::Error),

    /// The extraction process ran but reported failure.
    #[error("Extractor exited with {status}: {stderr}")]
    Failed {
        /// Process exit status
        status: ExitStatus,
        /// Captured standard error, trimmed
        stderr: String,
    },
}

/// Boxed future returned by [`Extractor::materialize`].
pub type ExtractFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExtractError>> + Send + 'a>>;

/// Produces a tile's materialized extent from its parent's extent.
///
/// # Contract
///
/// - May take seconds to tens of minutes depending on input size.
/// - Must be safely invocable concurrently for distinct output paths;
///   implementations hold no shared mutable state across invocations.
/// - Failure is reported through the `Result`, never by panicking.
/// - Dropping the returned future aborts the work best-effort (the
///   subprocess implementation kills the child process).
pub trait Extractor: Send + Sync + 'static {
    /// Carves `bounds` out of the extract at `parent`, writing the result
    /// to `output`.
    fn materialize<'a>(
        &'a self,
        parent: &'a Path,
        bounds: BoundingBox,
        output: &'a Path,
    ) -> ExtractFuture<'a>;
}
