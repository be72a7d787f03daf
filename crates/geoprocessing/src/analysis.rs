//! The analysis orchestrator: request in, result table out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use tile_storage::{TileReader, WindowRead};
use zonal_common::{Polygon, TileId, Window};

use crate::aggregate::{aggregate, Analysis, ResultTable};
use crate::assemble::build_array;
use crate::error::{GeoprocessingError, Result};
use crate::mask::{geometry_mask, mask_by_nodata, mask_by_threshold, or_mask};

/// A threshold filter over one raster.
///
/// Pixels where the raster's value falls below `threshold` are excluded
/// from the analysis. Multiple filters are conjunctive: a pixel must pass
/// every filter to survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Raster to evaluate the filter against.
    pub raster_id: String,
    /// Pixels with values below this are excluded.
    pub threshold: f64,
}

fn default_analyses() -> Vec<Analysis> {
    vec![Analysis::Count, Analysis::Area]
}

/// A zonal statistics request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Polygon to clip the analysis to, as a GeoJSON `Polygon`.
    pub geometry: Polygon,
    /// The raster whose nodata mask and transform drive the analysis.
    /// Its values form the first group-key column.
    pub analysis_raster_id: String,
    /// Rasters whose values extend the group key.
    #[serde(default)]
    pub contextual_raster_ids: Vec<String>,
    /// Rasters summed per group when `sum` is requested.
    #[serde(default)]
    pub aggregate_raster_ids: Vec<String>,
    /// Threshold filters, applied conjunctively.
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Statistics to compute. Defaults to `count` and `area`.
    #[serde(default = "default_analyses")]
    pub analyses: Vec<Analysis>,
}

/// Runs zonal analyses against a tile reader.
///
/// Stateless apart from the reader handle; one engine serves concurrent
/// requests.
#[derive(Clone)]
pub struct AnalysisEngine {
    reader: Arc<dyn TileReader>,
}

impl AnalysisEngine {
    /// Create an engine over the given tile reader.
    pub fn new(reader: Arc<dyn TileReader>) -> Self {
        Self { reader }
    }

    /// Run one analysis request end to end.
    ///
    /// The geometry's bounds select a tile and a read window on the
    /// analysis raster. A missing analysis tile is fatal
    /// ([`GeoprocessingError::DataNotAvailable`]): without it there is no
    /// window, no transform and no nodata mask to anchor the request.
    /// Missing filter, contextual or aggregate tiles degrade gracefully.
    #[instrument(
        skip(self, request),
        fields(analysis_raster = %request.analysis_raster_id)
    )]
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<ResultTable> {
        request.geometry.validate()?;
        let bounds = request.geometry.bounds();
        let tile_id = TileId::for_bounds(&bounds);
        debug!(%tile_id, ?bounds, "resolved analysis tile");

        let analysis_id = &request.analysis_raster_id;
        let info = self
            .reader
            .tile_info(analysis_id, &tile_id)
            .await?
            .ok_or_else(|| GeoprocessingError::DataNotAvailable(analysis_id.clone()))?;

        let window = Window::from_bounds(&bounds, &info.transform, info.width, info.height)?;

        let analysis_band = match self
            .reader
            .read_window(analysis_id, &tile_id, &window)
            .await?
        {
            WindowRead::Present(band) => band,
            WindowRead::Absent => {
                return Err(GeoprocessingError::DataNotAvailable(analysis_id.clone()))
            }
        };

        let shape = analysis_band.shape();
        let mut mask = geometry_mask(&request.geometry, &analysis_band.transform, shape);
        if let Some(nodata) = analysis_band.nodata {
            or_mask(&mut mask, &mask_by_nodata(&analysis_band.data, nodata));
        }

        for filter in &request.filters {
            match self
                .reader
                .read_window(&filter.raster_id, &tile_id, &window)
                .await?
            {
                WindowRead::Present(band) => {
                    if band.shape() != shape {
                        return Err(GeoprocessingError::ShapeMismatch {
                            raster_id: filter.raster_id.clone(),
                            expected: shape,
                            actual: band.shape(),
                        });
                    }
                    or_mask(&mut mask, &mask_by_threshold(&band.data, filter.threshold));
                }
                WindowRead::Absent => {
                    debug!(raster_id = %filter.raster_id, "filter raster absent, skipping filter");
                }
            }
        }

        let area = request.analyses.contains(&Analysis::Area);
        let table = build_array(
            &mask,
            &analysis_band,
            analysis_id,
            &request.contextual_raster_ids,
            &request.aggregate_raster_ids,
            self.reader.as_ref(),
            &tile_id,
            &window,
            area,
        )
        .await?;

        debug!(pixels = table.len(), "assembled pixel table");
        aggregate(&table, &request.analyses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tile_storage::MemoryTileReader;
    use zonal_common::GeoTransform;

    use crate::aggregate::ColumnValues;

    fn square(min: f64, max: f64) -> Polygon {
        Polygon::new(vec![(min, min), (max, min), (max, max), (min, max)])
    }

    fn seeded_reader() -> MemoryTileReader {
        let transform = GeoTransform::north_up(0.0, 3.0, 1.0, -1.0);
        let tile = TileId { top: 10, left: 0 };
        let mut reader = MemoryTileReader::new();
        reader.insert(
            "loss",
            tile,
            array![[1.0, 2.0, 3.0], [2.0, 3.0, 4.0], [3.0, 4.0, 5.0]],
            Some(0.0),
            transform,
        );
        reader.insert(
            "wdpa",
            tile,
            array![[2.0, 3.0, 4.0], [3.0, 4.0, 5.0], [4.0, 5.0, 6.0]],
            None,
            transform,
        );
        reader.insert(
            "tcd",
            tile,
            array![[2.0, 3.0, 4.0], [3.0, 4.0, 5.0], [4.0, 5.0, 6.0]],
            None,
            transform,
        );
        reader.insert(
            "biomass",
            tile,
            array![[3.0, 4.0, 5.0], [4.0, 5.0, 6.0], [5.0, 6.0, 7.0]],
            None,
            transform,
        );
        reader
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            geometry: square(0.1, 2.9),
            analysis_raster_id: "loss".to_string(),
            contextual_raster_ids: vec!["wdpa".to_string()],
            aggregate_raster_ids: vec!["biomass".to_string()],
            filters: vec![Filter {
                raster_id: "tcd".to_string(),
                threshold: 4.0,
            }],
            analyses: vec![Analysis::Count, Analysis::Sum],
        }
    }

    #[tokio::test]
    async fn test_analyze_end_to_end() {
        let engine = AnalysisEngine::new(Arc::new(seeded_reader()));
        let result = engine.analyze(&request()).await.unwrap();

        assert_eq!(
            result.column("loss"),
            Some(&ColumnValues::Float(vec![3.0, 4.0, 5.0]))
        );
        assert_eq!(
            result.column("wdpa"),
            Some(&ColumnValues::Float(vec![4.0, 5.0, 6.0]))
        );
        assert_eq!(
            result.column("count"),
            Some(&ColumnValues::Int(vec![3, 2, 1]))
        );
        assert_eq!(
            result.column("biomass"),
            Some(&ColumnValues::Float(vec![15.0, 12.0, 7.0]))
        );
    }

    #[tokio::test]
    async fn test_missing_analysis_tile_is_fatal() {
        let engine = AnalysisEngine::new(Arc::new(MemoryTileReader::new()));
        let err = engine.analyze(&request()).await.unwrap_err();
        assert!(matches!(err, GeoprocessingError::DataNotAvailable(_)));
    }

    #[tokio::test]
    async fn test_absent_filter_raster_is_skipped() {
        let engine = AnalysisEngine::new(Arc::new(seeded_reader()));
        let mut req = request();
        req.filters[0].raster_id = "no_such_raster".to_string();

        let result = engine.analyze(&req).await.unwrap();

        // With the filter gone, all 9 pixels survive.
        let Some(ColumnValues::Int(counts)) = result.column("count") else {
            panic!("count column missing");
        };
        assert_eq!(counts.iter().sum::<u64>(), 9);
    }

    #[tokio::test]
    async fn test_geometry_clips_pixels() {
        let engine = AnalysisEngine::new(Arc::new(seeded_reader()));
        let mut req = request();
        req.filters.clear();
        // Covers only the top row of pixel centers (lat 2.5).
        req.geometry = Polygon::new(vec![(0.0, 2.0), (3.0, 2.0), (3.0, 3.0), (0.0, 3.0)]);

        let result = engine.analyze(&req).await.unwrap();
        let Some(ColumnValues::Int(counts)) = result.column("count") else {
            panic!("count column missing");
        };
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[tokio::test]
    async fn test_invalid_geometry_rejected() {
        let engine = AnalysisEngine::new(Arc::new(seeded_reader()));
        let mut req = request();
        req.geometry = Polygon {
            ring: vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)],
        };

        let err = engine.analyze(&req).await.unwrap_err();
        assert!(matches!(err, GeoprocessingError::InvalidGeometry(_)));
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]},
            "analysis_raster_id": "loss"
        }"#;
        let req: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert!(req.contextual_raster_ids.is_empty());
        assert!(req.filters.is_empty());
        assert_eq!(req.analyses, vec![Analysis::Count, Analysis::Area]);
    }
}
