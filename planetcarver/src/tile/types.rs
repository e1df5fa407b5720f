//! Tile and bounding-box type definitions

use std::f64::consts::PI;
use std::fmt;
use thiserror::Error;

/// Upper bound on zoom levels accepted by [`Tile::new`].
///
/// At zoom 30 tile coordinates still fit comfortably in `u32`; the
/// splitter never goes anywhere near this deep (the original planet
/// workflow stops at zoom 9).
pub const MAX_ZOOM_LIMIT: u8 = 30;

/// Errors produced by tile construction.
///
/// These indicate programmer errors (coordinates outside the quadtree),
/// not runtime conditions to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Zoom level exceeds [`MAX_ZOOM_LIMIT`].
    #[error("Invalid zoom level {0} (must be at most {MAX_ZOOM_LIMIT})")]
    InvalidZoom(u8),

    /// X or Y coordinate is outside `[0, 2^z)`.
    #[error("Coordinates ({x}, {y}) out of range for zoom {z} (must be below {limit})")]
    OutOfRange {
        /// Zoom level
        z: u8,
        /// X coordinate
        x: u32,
        /// Y coordinate
        y: u32,
        /// Number of tiles per axis at this zoom (`2^z`)
        limit: u64,
    },
}

/// A node in the quadtree, identified by zoom level and `(x, y)` position.
///
/// Tiles are plain values: computed on demand, never mutated, and
/// interchangeable whenever the `(z, x, y)` triples match. Zoom 0 is the
/// whole dataset; each zoom step quarters a tile into 4 children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Zoom level (depth in the quadtree), 0 is the root
    pub z: u8,
    /// X coordinate (east-west), 0 at the antimeridian
    pub x: u32,
    /// Y coordinate (north-south), 0 at the north edge
    pub y: u32,
}

impl Tile {
    /// The root tile covering the entire dataset.
    pub const ROOT: Tile = Tile { z: 0, x: 0, y: 0 };

    /// Creates a tile, validating that the coordinates lie inside the
    /// quadtree at the given zoom level.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, TileError> {
        if z > MAX_ZOOM_LIMIT {
            return Err(TileError::InvalidZoom(z));
        }
        let limit = 1u64 << z;
        if u64::from(x) >= limit || u64::from(y) >= limit {
            return Err(TileError::OutOfRange { z, x, y, limit });
        }
        Ok(Self { z, x, y })
    }

    /// Returns the parent tile, or `None` for the root.
    ///
    /// For `z > 0` the parent is uniquely `(z-1, x/2, y/2)`.
    pub fn parent(&self) -> Option<Tile> {
        if self.z == 0 {
            return None;
        }
        Some(Tile {
            z: self.z - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// Returns the 4 child tiles in canonical order:
    /// `(2x, 2y)`, `(2x+1, 2y)`, `(2x, 2y+1)`, `(2x+1, 2y+1)`.
    ///
    /// The order carries no scheduling meaning but is stable so tests can
    /// make deterministic assertions.
    pub fn children(&self) -> [Tile; 4] {
        let z = self.z + 1;
        let (x, y) = (self.x * 2, self.y * 2);
        [
            Tile { z, x, y },
            Tile { z, x: x + 1, y },
            Tile { z, x, y: y + 1 },
            Tile { z, x: x + 1, y: y + 1 },
        ]
    }

    /// Returns the geographic bounding box of this tile.
    ///
    /// Standard slippy-tile formula: longitudes are linear in `x`,
    /// latitudes come from the inverse Web Mercator projection of `y`.
    /// The result is a deterministic pure function of `(z, x, y)` in
    /// double precision.
    pub fn bounds(&self) -> BoundingBox {
        let n = 2f64.powi(i32::from(self.z));

        let lon = |x: f64| x / n * 360.0 - 180.0;
        let lat = |y: f64| (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();

        BoundingBox {
            west: lon(f64::from(self.x)),
            south: lat(f64::from(self.y) + 1.0),
            east: lon(f64::from(self.x) + 1.0),
            north: lat(f64::from(self.y)),
        }
    }

    /// Returns the deterministic file stem for this tile (`{z}_{x}_{y}`).
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.z, self.x, self.y)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Geographic bounding box of a tile, in degrees.
///
/// West/east are longitudes, south/north latitudes. For any tile,
/// `west < east` and `south < north`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western edge longitude
    pub west: f64,
    /// Southern edge latitude
    pub south: f64,
    /// Eastern edge longitude
    pub east: f64,
    /// Northern edge latitude
    pub north: f64,
}

impl fmt::Display for BoundingBox {
    /// Formats as `west,south,east,north`, the order `osmconvert -b=` expects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}
