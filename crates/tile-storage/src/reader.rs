//! The windowed tile read contract.

use async_trait::async_trait;
use ndarray::Array2;
use thiserror::Error;

use zonal_common::{GeoTransform, TileId, Window};

/// One raster band read over one window.
///
/// Created per request, read-only, discarded after assembly.
#[derive(Debug, Clone)]
pub struct RasterBand {
    /// Pixel values, shape `(window.height, window.width)`.
    pub data: Array2<f64>,
    /// Nodata sentinel, if the raster defines one.
    pub nodata: Option<f64>,
    /// Geotransform of the window (not of the whole tile).
    pub transform: GeoTransform,
}

impl RasterBand {
    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Outcome of a windowed tile read.
///
/// A tile that does not exist is an ordinary outcome, not an error:
/// raster coverage is sparse and requests degrade gracefully when a
/// contributing raster has no tile at the requested location.
#[derive(Debug, Clone)]
pub enum WindowRead {
    /// The tile exists; here is the requested window.
    Present(RasterBand),
    /// No tile is stored for this raster at this location.
    Absent,
}

impl WindowRead {
    /// The band, if present.
    pub fn band(self) -> Option<RasterBand> {
        match self {
            WindowRead::Present(band) => Some(band),
            WindowRead::Absent => None,
        }
    }
}

/// Errors reading tile data.
///
/// `NotFound` conditions never surface here; they map to
/// [`WindowRead::Absent`].
#[derive(Debug, Error)]
pub enum TileStoreError {
    /// Transport or object-store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The tile metadata object could not be parsed.
    #[error("invalid tile metadata for {raster_id}/{tile_id}: {message}")]
    InvalidMetadata {
        raster_id: String,
        tile_id: String,
        message: String,
    },

    /// The requested window exceeds the tile's pixel extent.
    #[error("window {window:?} is outside tile {tile_id} ({width}x{height})")]
    WindowOutOfBounds {
        tile_id: String,
        window: Window,
        width: usize,
        height: usize,
    },

    /// The data object has the wrong length for the advertised dimensions.
    #[error("tile data for {raster_id}/{tile_id} is truncated: {message}")]
    Truncated {
        raster_id: String,
        tile_id: String,
        message: String,
    },
}

/// Pixel extent and georeferencing of a stored tile.
///
/// Needed before the first windowed read: the read window is derived from
/// a geometry's bounds via this transform and clipped to these dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileInfo {
    /// Tile width in pixels.
    pub width: usize,
    /// Tile height in pixels.
    pub height: usize,
    /// Geotransform of the full tile.
    pub transform: GeoTransform,
}

/// Windowed read access to tiled raster data.
#[async_trait]
pub trait TileReader: Send + Sync {
    /// Look up the extent and transform of a tile, or `None` when the tile
    /// does not exist.
    async fn tile_info(
        &self,
        raster_id: &str,
        tile_id: &TileId,
    ) -> Result<Option<TileInfo>, TileStoreError>;

    /// Read `window` of the tile `tile_id` of raster `raster_id`.
    ///
    /// Returns `Ok(WindowRead::Absent)` when the tile does not exist and
    /// `Err` only for transport or consistency failures.
    async fn read_window(
        &self,
        raster_id: &str,
        tile_id: &TileId,
        window: &Window,
    ) -> Result<WindowRead, TileStoreError>;
}
