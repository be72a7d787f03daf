//! Error types for the zonal statistics core.

use thiserror::Error;

use tile_storage::TileStoreError;
use zonal_common::geometry::GeometryError;
use zonal_common::window::WindowError;

/// Errors that can occur during a zonal analysis.
///
/// A missing contextual/aggregate tile is *not* represented here: it is an
/// ordinary outcome handled by substitution inside the array assembler and
/// never surfaces to the caller.
#[derive(Error, Debug)]
pub enum GeoprocessingError {
    /// Two rasters read for the same window disagree in pixel dimensions.
    /// This is a geo-alignment invariant violation and always fatal.
    #[error("raster {raster_id} has shape {actual:?} but the analysis window is {expected:?}")]
    ShapeMismatch {
        raster_id: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A requested statistic needs a column that was not built.
    #[error("aggregation requires the '{0}' column, which was not built")]
    MissingColumn(String),

    /// The geometry does not intersect the analysis raster extent.
    #[error(transparent)]
    EmptyWindow(#[from] WindowError),

    /// The analysis raster has no tile at the requested location, so the
    /// request has no window or transform to work from.
    #[error("analysis raster {0} has no tile at the requested location")]
    DataNotAvailable(String),

    /// The request geometry is malformed.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// Transport or consistency failure from the tile reader.
    #[error(transparent)]
    Storage(#[from] TileStoreError),
}

/// Result type for zonal analysis operations.
pub type Result<T> = std::result::Result<T, GeoprocessingError>;
