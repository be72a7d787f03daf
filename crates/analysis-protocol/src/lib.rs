//! Wire schema for the zonal analysis API.
//!
//! This crate owns everything that crosses the HTTP boundary: query
//! parameter types for the named analysis endpoints, their translation
//! into core [`geoprocessing::AnalysisRequest`]s, the result decoration
//! that turns raw raster values into user-facing columns, response
//! envelopes, and the geostore payload types.

pub mod convert;
pub mod geostore;
pub mod queries;
pub mod responses;

pub use convert::{alert_date, decorate_result, encode_alert_date, loss_year};
pub use geostore::Geostore;
pub use queries::{GladAlertsQuery, TreeCoverLossQuery};
pub use responses::{AnalysisResponse, ExceptionResponse};
