//! Affine geotransforms mapping pixel space to world coordinates.

use serde::{Deserialize, Serialize};

/// An affine transform in GDAL coefficient order.
///
/// World coordinates of the top-left corner of pixel `(col, row)`:
///
/// ```text
/// x = c + a * col + b * row
/// y = f + d * col + e * row
/// ```
///
/// For north-up rasters `b = d = 0`, `a > 0` (pixel width) and `e < 0`
/// (pixel height, rows increase southward). Only axis-aligned transforms
/// are supported by the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// Create a north-up transform from origin and pixel size.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            a: pixel_width,
            b: 0.0,
            c: origin_x,
            d: 0.0,
            e: pixel_height,
            f: origin_y,
        }
    }

    /// The identity transform (pixel indices are world coordinates).
    pub fn identity() -> Self {
        Self::north_up(0.0, 0.0, 1.0, 1.0)
    }

    /// World coordinates of the top-left corner of a pixel.
    pub fn xy(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.c + self.a * col + self.b * row,
            self.f + self.d * col + self.e * row,
        )
    }

    /// Fractional pixel indices for a world coordinate.
    pub fn col_row(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.c) / self.a, (y - self.f) / self.e)
    }

    /// Absolute pixel width in degrees.
    pub fn pixel_width(&self) -> f64 {
        self.a.abs()
    }

    /// Absolute pixel height in degrees.
    pub fn pixel_height(&self) -> f64 {
        self.e.abs()
    }

    /// Latitude of the northern edge of a pixel row.
    pub fn row_north_lat(&self, row: usize) -> f64 {
        let top = self.f + self.e * row as f64;
        let bottom = self.f + self.e * (row as f64 + 1.0);
        top.max(bottom)
    }

    /// Derive the transform of a window within this raster.
    pub fn for_window(&self, col_off: usize, row_off: usize) -> Self {
        let (x, y) = self.xy(col_off as f64, row_off as f64);
        Self {
            c: x,
            f: y,
            ..*self
        }
    }

    /// Coefficients in GDAL order `[a, b, c, d, e, f]`.
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Build from GDAL-ordered coefficients.
    pub fn from_coefficients(g: [f64; 6]) -> Self {
        Self {
            a: g[0],
            b: g[1],
            c: g[2],
            d: g[3],
            e: g[4],
            f: g[5],
        }
    }
}
