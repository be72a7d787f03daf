//! Pixel windows: rectangular read regions within a raster.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, GeoTransform};

/// A rectangular pixel region within a raster.
///
/// Always non-empty and clipped to the raster's valid extent when built
/// through [`Window::from_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Column offset of the left edge.
    pub col_off: usize,
    /// Row offset of the top edge.
    pub row_off: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Window {
    /// Create a window from offsets and size.
    pub fn new(col_off: usize, row_off: usize, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// Compute the window covering `bounds` in a raster with the given
    /// transform and dimensions.
    ///
    /// The fractional pixel range is expanded outward to whole pixels and
    /// clipped to the raster extent. Returns an error when the bounds do
    /// not intersect the raster at all.
    pub fn from_bounds(
        bounds: &BoundingBox,
        transform: &GeoTransform,
        raster_width: usize,
        raster_height: usize,
    ) -> Result<Self, WindowError> {
        let (c0, r0) = transform.col_row(bounds.min_x, bounds.max_y);
        let (c1, r1) = transform.col_row(bounds.max_x, bounds.min_y);

        let col_start = c0.min(c1).floor();
        let col_end = c0.max(c1).ceil();
        let row_start = r0.min(r1).floor();
        let row_end = r0.max(r1).ceil();

        let col_off = col_start.max(0.0) as usize;
        let row_off = row_start.max(0.0) as usize;
        let col_end = (col_end.max(0.0) as usize).min(raster_width);
        let row_end = (row_end.max(0.0) as usize).min(raster_height);

        if col_end <= col_off || row_end <= row_off {
            return Err(WindowError::Empty {
                bounds: format!("{:?}", bounds),
            });
        }

        Ok(Self {
            col_off,
            row_off,
            width: col_end - col_off,
            height: row_end - row_off,
        })
    }

    /// Shape as `(rows, cols)`, matching array indexing order.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Total number of pixels in the window.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// A window is never empty when built through `from_bounds`, but raw
    /// construction permits it.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Errors computing a read window.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// The geometry bounds do not intersect the raster extent.
    #[error("geometry bounds {bounds} do not intersect the raster extent")]
    Empty { bounds: String },
}
