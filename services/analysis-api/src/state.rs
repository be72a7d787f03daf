//! Application state for the analysis API.

use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;

use geoprocessing::AnalysisEngine;
use tile_storage::{S3TileReader, TileReader, TileStorageConfig};

use crate::geostore_client::GeostoreClient;

/// Default area limit for the direct analysis path, in hectares.
pub const DEFAULT_MAX_AREA_HA: f64 = 5_000_000.0;

/// Shared application state.
pub struct AppState {
    /// The zonal analysis engine.
    pub engine: AnalysisEngine,

    /// Client for resolving geostore ids to geometries.
    pub geostore: GeostoreClient,

    /// Geometries above this area (hectares) are refused.
    pub max_area_ha: f64,

    /// Prometheus render handle for the /metrics endpoint.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create state from environment configuration.
    pub fn from_env(
        geostore_url: String,
        max_area_ha: f64,
        metrics: PrometheusHandle,
    ) -> Result<Self> {
        let storage = TileStorageConfig {
            endpoint: std::env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "raster-tiles".to_string()),
            access_key_id: std::env::var("S3_ACCESS_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            secret_access_key: std::env::var("S3_SECRET_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            allow_http: true,
            prefix: std::env::var("TILE_PREFIX").unwrap_or_else(|_| "tiles".to_string()),
        };

        let reader = S3TileReader::new(&storage)?;
        Ok(Self::with_reader(
            Arc::new(reader),
            geostore_url,
            max_area_ha,
            metrics,
        ))
    }

    /// Create state over an arbitrary tile reader (used by tests with the
    /// in-memory reader).
    pub fn with_reader(
        reader: Arc<dyn TileReader>,
        geostore_url: String,
        max_area_ha: f64,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            engine: AnalysisEngine::new(reader),
            geostore: GeostoreClient::new(geostore_url),
            max_area_ha,
            metrics,
        }
    }
}
