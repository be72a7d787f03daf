//! Tile identifiers for the 10°×10° raster tile grid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// Identifier of a 10°×10° raster tile, named by its top-left corner.
///
/// Examples: `10N_000E` covers latitudes 0..10 and longitudes 0..10;
/// `50N_130W` covers latitudes 40..50 and longitudes -130..-120.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    /// Latitude of the top edge, in degrees (multiple of 10).
    pub top: i32,
    /// Longitude of the left edge, in degrees (multiple of 10).
    pub left: i32,
}

impl TileId {
    /// Tile containing the top-left corner of the given bounds.
    ///
    /// Cross-tile geometries are clipped to this tile by the read window;
    /// mosaicking across tile boundaries is not supported.
    pub fn for_bounds(bounds: &BoundingBox) -> Self {
        Self {
            top: ((bounds.max_y / 10.0).ceil() * 10.0) as i32,
            left: ((bounds.min_x / 10.0).floor() * 10.0) as i32,
        }
    }

    /// Geographic extent covered by this tile.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.left as f64,
            (self.top - 10) as f64,
            (self.left + 10) as f64,
            self.top as f64,
        )
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.top >= 0 { 'N' } else { 'S' };
        let ew = if self.left >= 0 { 'E' } else { 'W' };
        write!(
            f,
            "{:02}{}_{:03}{}",
            self.top.abs(),
            ns,
            self.left.abs(),
            ew
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_bounds() {
        let bounds = BoundingBox::new(9.0, 4.1, 9.1, 4.2);
        let tile = TileId::for_bounds(&bounds);
        assert_eq!(tile, TileId { top: 10, left: 0 });
        assert_eq!(tile.to_string(), "10N_000E");
    }

    #[test]
    fn test_western_southern_tiles() {
        let bounds = BoundingBox::new(-62.3, -11.8, -62.1, -11.5);
        let tile = TileId::for_bounds(&bounds);
        assert_eq!(tile, TileId { top: -10, left: -70 });
        assert_eq!(tile.to_string(), "10S_070W");
    }

    #[test]
    fn test_tile_bounds() {
        let tile = TileId { top: 10, left: 0 };
        assert_eq!(tile.bounds(), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }
}
