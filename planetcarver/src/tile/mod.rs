//! Quadtree tile index
//!
//! Identifies rectangular regions of the dataset by `(zoom, x, y)` triples
//! in the Web Mercator / Slippy Map tiling scheme and provides the
//! parent/children relations and geographic bounding boxes the splitter
//! needs. Everything here is pure computation over tile values; no
//! filesystem or network state is involved.

mod types;

pub use types::{BoundingBox, Tile, TileError, MAX_ZOOM_LIMIT};

#[cfg(test)]
mod tests;
