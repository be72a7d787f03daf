//! In-memory tile reader for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use ndarray::{s, Array2};

use zonal_common::{GeoTransform, TileId, Window};

use crate::reader::{RasterBand, TileInfo, TileReader, TileStoreError, WindowRead};

/// A tile held in memory.
#[derive(Debug, Clone)]
pub struct MemoryTile {
    pub data: Array2<f64>,
    pub nodata: Option<f64>,
    pub transform: GeoTransform,
}

/// Tile reader over an in-memory map, for unit and integration tests.
///
/// Rasters without an entry for the requested tile come back as
/// [`WindowRead::Absent`], which makes missing-tile scenarios trivial to
/// stage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileReader {
    tiles: HashMap<(String, TileId), MemoryTile>,
}

impl MemoryTileReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tile for `raster_id`.
    pub fn insert(
        &mut self,
        raster_id: impl Into<String>,
        tile_id: TileId,
        data: Array2<f64>,
        nodata: Option<f64>,
        transform: GeoTransform,
    ) -> &mut Self {
        self.tiles.insert(
            (raster_id.into(), tile_id),
            MemoryTile {
                data,
                nodata,
                transform,
            },
        );
        self
    }
}

#[async_trait]
impl TileReader for MemoryTileReader {
    async fn tile_info(
        &self,
        raster_id: &str,
        tile_id: &TileId,
    ) -> Result<Option<TileInfo>, TileStoreError> {
        Ok(self
            .tiles
            .get(&(raster_id.to_string(), *tile_id))
            .map(|tile| {
                let (height, width) = tile.data.dim();
                TileInfo {
                    width,
                    height,
                    transform: tile.transform,
                }
            }))
    }

    async fn read_window(
        &self,
        raster_id: &str,
        tile_id: &TileId,
        window: &Window,
    ) -> Result<WindowRead, TileStoreError> {
        let Some(tile) = self.tiles.get(&(raster_id.to_string(), *tile_id)) else {
            return Ok(WindowRead::Absent);
        };

        let (height, width) = tile.data.dim();
        if window.col_off + window.width > width || window.row_off + window.height > height {
            return Err(TileStoreError::WindowOutOfBounds {
                tile_id: tile_id.to_string(),
                window: *window,
                width,
                height,
            });
        }

        let data = tile
            .data
            .slice(s![
                window.row_off..window.row_off + window.height,
                window.col_off..window.col_off + window.width
            ])
            .to_owned();

        Ok(WindowRead::Present(RasterBand {
            data,
            nodata: tile.nodata,
            transform: tile.transform.for_window(window.col_off, window.row_off),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[tokio::test]
    async fn test_window_slice() {
        let mut reader = MemoryTileReader::new();
        let tile = TileId { top: 10, left: 0 };
        reader.insert(
            "loss",
            tile,
            array![[1.0, 2.0], [3.0, 4.0]],
            Some(0.0),
            GeoTransform::identity(),
        );

        let read = reader
            .read_window("loss", &tile, &Window::new(1, 0, 1, 2))
            .await
            .unwrap();
        let band = read.band().unwrap();
        assert_eq!(band.data, array![[2.0], [4.0]]);
    }

    #[tokio::test]
    async fn test_unknown_raster_absent() {
        let reader = MemoryTileReader::new();
        let tile = TileId { top: 10, left: 0 };
        let read = reader
            .read_window("wdpa", &tile, &Window::new(0, 0, 1, 1))
            .await
            .unwrap();
        assert!(matches!(read, WindowRead::Absent));
    }
}
