//! PlanetCarver - Recursive quadtree splitting of planet-scale OSM extracts
//!
//! This library partitions a planet-scale OpenStreetMap extract into a
//! hierarchy of progressively smaller sub-extracts, stopping each branch
//! once it falls under a target byte size. The geospatial carving itself is
//! delegated to an external tool (`osmconvert`); the library's job is the
//! recursive, concurrent, resumable scheduling of that work.
//!
//! # High-Level API
//!
//! ```ignore
//! use planetcarver::extract::OsmConvertExtractor;
//! use planetcarver::scheduler::{SchedulerConfig, SplitScheduler};
//! use planetcarver::sink::OutputDirSink;
//! use planetcarver::store::ExtentStore;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let store = ExtentStore::new("tmp");
//! let config = SchedulerConfig::default().with_max_zoom(9);
//! let scheduler = SplitScheduler::new(
//!     store,
//!     Arc::new(OsmConvertExtractor::new()),
//!     Arc::new(OutputDirSink::new("out")),
//!     config,
//! );
//!
//! let summary = scheduler.run(CancellationToken::new()).await?;
//! println!("{}", summary);
//! ```

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod logging;
pub mod scheduler;
pub mod sink;
pub mod store;
pub mod tile;

/// Version of the PlanetCarver library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
