//! Array assembly: align every requested raster over one window and turn
//! the unmasked pixels into a row-per-pixel table.

use ndarray::Array2;
use tracing::debug;

use tile_storage::{RasterBand, TileReader, WindowRead};
use zonal_common::{TileId, Window};

use crate::area::pixel_area;
use crate::error::{GeoprocessingError, Result};
use crate::mask::{mask_by_nodata, or_mask};

/// A table with one row per valid pixel.
///
/// Column order is stable: `[analysis, contextual..., aggregate..., area?]`.
/// Rows are in raster-scan (row-major) order, which keeps grouping
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTable {
    /// Column names, aligned with the columns of `data`.
    pub columns: Vec<String>,
    /// Row-major pixel values.
    pub data: Array2<f64>,
    /// Number of leading group-key columns (analysis + contextual).
    pub group_count: usize,
    /// Index of the synthetic area column, when built.
    pub area_index: Option<usize>,
}

impl PixelTable {
    /// Number of rows (valid pixels).
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// True when no pixel survived masking.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the aggregate (summable) columns.
    pub fn aggregate_columns(&self) -> &[String] {
        let end = self.area_index.unwrap_or(self.columns.len());
        &self.columns[self.group_count..end]
    }
}

/// Read every additional raster over the analysis window, stack the bands
/// into columns, and keep only the rows where the final mask is false.
///
/// * A missing tile for an additional raster substitutes a constant band
///   (the analysis raster's nodata, or 0.0) and contributes no mask terms,
///   so partial raster coverage degrades gracefully.
/// * A band that is present but has a defined nodata value OR-s its nodata
///   mask into the final mask before rows are selected.
/// * A band whose dimensions disagree with the analysis window is a fatal
///   [`GeoprocessingError::ShapeMismatch`].
/// * With `area = true`, one extra column carries the geodesic ground area
///   of each pixel, derived from the analysis transform and the pixel row.
#[allow(clippy::too_many_arguments)]
pub async fn build_array(
    mask: &Array2<bool>,
    analysis_band: &RasterBand,
    analysis_raster_id: &str,
    contextual_raster_ids: &[String],
    aggregate_raster_ids: &[String],
    reader: &dyn TileReader,
    tile_id: &TileId,
    window: &Window,
    area: bool,
) -> Result<PixelTable> {
    let shape = analysis_band.shape();
    let fill = analysis_band.nodata.unwrap_or(0.0);

    let mut final_mask = mask.clone();
    let mut columns = vec![analysis_raster_id.to_string()];
    let mut bands: Vec<Array2<f64>> = vec![analysis_band.data.clone()];

    for raster_id in contextual_raster_ids.iter().chain(aggregate_raster_ids) {
        match reader.read_window(raster_id, tile_id, window).await? {
            WindowRead::Present(band) => {
                if band.shape() != shape {
                    return Err(GeoprocessingError::ShapeMismatch {
                        raster_id: raster_id.clone(),
                        expected: shape,
                        actual: band.shape(),
                    });
                }
                if let Some(nodata) = band.nodata {
                    or_mask(&mut final_mask, &mask_by_nodata(&band.data, nodata));
                }
                bands.push(band.data);
            }
            WindowRead::Absent => {
                debug!(raster_id = %raster_id, "tile absent, substituting fill value");
                bands.push(Array2::from_elem(shape, fill));
            }
        }
        columns.push(raster_id.clone());
    }

    let group_count = 1 + contextual_raster_ids.len();
    let area_index = if area {
        columns.push("area".to_string());
        Some(columns.len() - 1)
    } else {
        None
    };

    let n_rows = final_mask.iter().filter(|&&m| !m).count();
    let n_cols = columns.len();

    let mut values = Vec::with_capacity(n_rows * n_cols);
    for ((row, col), &masked) in final_mask.indexed_iter() {
        if masked {
            continue;
        }
        for band in &bands {
            values.push(band[[row, col]]);
        }
        if area {
            values.push(pixel_area(&analysis_band.transform, row));
        }
    }

    let data = Array2::from_shape_vec((n_rows, n_cols), values)
        .expect("row construction matches declared shape");

    Ok(PixelTable {
        columns,
        data,
        group_count,
        area_index,
    })
}
