//! Zonal statistics over raster tiles clipped to a polygon.
//!
//! For a user-supplied geometry this crate reads one *analysis* raster
//! plus optional *contextual* and *aggregate* rasters over the same pixel
//! window, derives a per-pixel validity mask (nodata, threshold filters,
//! geometry boundary), and groups the surviving pixels by their
//! combination of categorical values into summary statistics.
//!
//! # Pipeline
//!
//! ```text
//! AnalysisRequest
//!      │
//!      ▼
//! AnalysisEngine::analyze
//!      │
//!      ├─► window from geometry bounds + analysis raster transform
//!      ├─► mask: nodata ∪ filter thresholds ∪ outside-geometry
//!      ├─► build_array: align every band, drop masked pixels
//!      └─► aggregate: group by (analysis, contextual...) values
//!               │
//!               ▼
//!          ResultTable (column name → per-group values)
//! ```
//!
//! Rasters with no tile at the requested location degrade gracefully: a
//! missing contextual/aggregate tile is substituted, never fatal. Rasters
//! that disagree in window dimensions are a hard error (`ShapeMismatch`),
//! never silently corrected.

pub mod aggregate;
pub mod analysis;
pub mod area;
pub mod assemble;
pub mod error;
pub mod mask;

pub use aggregate::{aggregate, Analysis, ColumnValues, ResultTable};
pub use analysis::{AnalysisEngine, AnalysisRequest, Filter};
pub use area::pixel_area;
pub use assemble::{build_array, PixelTable};
pub use error::{GeoprocessingError, Result};
