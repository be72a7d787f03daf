//! Object-store backed tile reader (S3/MinIO compatible).

use std::sync::Arc;

use async_trait::async_trait;
use ndarray::Array2;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use zonal_common::{GeoTransform, TileId, Window};

use crate::reader::{RasterBand, TileInfo, TileReader, TileStoreError, WindowRead};

/// Configuration for the tile object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileStorageConfig {
    /// S3/MinIO endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO).
    pub region: String,
    /// Allow HTTP (for local MinIO).
    pub allow_http: bool,
    /// Key prefix under which raster tiles live, e.g. "tiles/2018_update".
    pub prefix: String,
}

impl Default for TileStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://minio:9000".to_string(),
            bucket: "raster-tiles".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
            prefix: "tiles".to_string(),
        }
    }
}

/// Per-tile metadata stored next to the pixel data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMeta {
    /// Tile width in pixels.
    pub width: usize,
    /// Tile height in pixels.
    pub height: usize,
    /// Nodata sentinel, if defined for this raster.
    pub nodata: Option<f64>,
    /// Geotransform coefficients in GDAL order `[a, b, c, d, e, f]`.
    pub transform: [f64; 6],
}

/// Tile reader over an S3-compatible object store.
pub struct S3TileReader {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl S3TileReader {
    /// Create a reader from config.
    pub fn new(config: &TileStorageConfig) -> Result<Self, TileStoreError> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| TileStoreError::Storage(format!("failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: config.prefix.clone(),
        })
    }

    /// Create a reader over an existing store (used by tests with a local
    /// filesystem store).
    pub fn with_store(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn meta_path(&self, raster_id: &str, tile_id: &TileId) -> Path {
        Path::from(format!("{}/{}/{}.json", self.prefix, raster_id, tile_id))
    }

    fn data_path(&self, raster_id: &str, tile_id: &TileId) -> Path {
        Path::from(format!("{}/{}/{}.bin", self.prefix, raster_id, tile_id))
    }

    async fn fetch_meta(
        &self,
        raster_id: &str,
        tile_id: &TileId,
    ) -> Result<Option<TileMeta>, TileStoreError> {
        let location = self.meta_path(raster_id, tile_id);

        let result = match self.store.get(&location).await {
            Ok(r) => r,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => {
                return Err(TileStoreError::Storage(format!(
                    "failed to read {}: {}",
                    location, e
                )))
            }
        };

        let bytes = result
            .bytes()
            .await
            .map_err(|e| TileStoreError::Storage(format!("failed to read bytes: {}", e)))?;

        let meta: TileMeta =
            serde_json::from_slice(&bytes).map_err(|e| TileStoreError::InvalidMetadata {
                raster_id: raster_id.to_string(),
                tile_id: tile_id.to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(meta))
    }
}

#[async_trait]
impl TileReader for S3TileReader {
    async fn tile_info(
        &self,
        raster_id: &str,
        tile_id: &TileId,
    ) -> Result<Option<TileInfo>, TileStoreError> {
        Ok(self.fetch_meta(raster_id, tile_id).await?.map(|meta| TileInfo {
            width: meta.width,
            height: meta.height,
            transform: GeoTransform::from_coefficients(meta.transform),
        }))
    }

    #[instrument(skip(self), fields(raster_id = %raster_id, tile_id = %tile_id))]
    async fn read_window(
        &self,
        raster_id: &str,
        tile_id: &TileId,
        window: &Window,
    ) -> Result<WindowRead, TileStoreError> {
        let Some(meta) = self.fetch_meta(raster_id, tile_id).await? else {
            debug!("tile metadata not found, treating as absent");
            return Ok(WindowRead::Absent);
        };

        if window.col_off + window.width > meta.width
            || window.row_off + window.height > meta.height
        {
            return Err(TileStoreError::WindowOutOfBounds {
                tile_id: tile_id.to_string(),
                window: *window,
                width: meta.width,
                height: meta.height,
            });
        }

        // One range request covering the window's rows; unwanted leading
        // and trailing columns of each row are sliced off locally.
        let row_bytes = meta.width * 4;
        let start = window.row_off * row_bytes;
        let end = (window.row_off + window.height) * row_bytes;

        let location = self.data_path(raster_id, tile_id);
        let bytes = match self.store.get_range(&location, start..end).await {
            Ok(b) => b,
            Err(object_store::Error::NotFound { .. }) => {
                debug!("tile data object not found, treating as absent");
                return Ok(WindowRead::Absent);
            }
            Err(e) => {
                return Err(TileStoreError::Storage(format!(
                    "failed to read range of {}: {}",
                    location, e
                )))
            }
        };

        if bytes.len() != end - start {
            return Err(TileStoreError::Truncated {
                raster_id: raster_id.to_string(),
                tile_id: tile_id.to_string(),
                message: format!("expected {} bytes, got {}", end - start, bytes.len()),
            });
        }

        let mut data = Array2::zeros((window.height, window.width));
        for row in 0..window.height {
            let row_start = row * row_bytes + window.col_off * 4;
            for col in 0..window.width {
                let offset = row_start + col * 4;
                let value = f32::from_le_bytes([
                    bytes[offset],
                    bytes[offset + 1],
                    bytes[offset + 2],
                    bytes[offset + 3],
                ]);
                data[[row, col]] = value as f64;
            }
        }

        debug!(
            rows = window.height,
            cols = window.width,
            "read tile window"
        );

        let tile_transform = GeoTransform::from_coefficients(meta.transform);
        Ok(WindowRead::Present(RasterBand {
            data,
            nodata: meta.nodata,
            transform: tile_transform.for_window(window.col_off, window.row_off),
        }))
    }
}
