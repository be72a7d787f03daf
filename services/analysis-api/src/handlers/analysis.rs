//! Analysis endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use tracing::warn;

use analysis_protocol::{
    decorate_result, AnalysisResponse, ExceptionResponse, GladAlertsQuery, TreeCoverLossQuery,
};
use geoprocessing::{AnalysisRequest, GeoprocessingError};
use zonal_common::{ZonalError, ZonalResult};

use crate::state::AppState;

/// POST /analysis - run a fully specified analysis request.
pub async fn analysis_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Response {
    metrics::counter!("analysis_requests_total", "endpoint" => "analysis").increment(1);
    run_analysis(&state, &request).await
}

/// GET /analysis/treecoverloss - loss-by-year statistics for a geostore.
pub async fn tree_cover_loss_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<TreeCoverLossQuery>,
) -> Response {
    metrics::counter!("analysis_requests_total", "endpoint" => "treecoverloss").increment(1);
    let request = match resolve_request(&state, &query.geostore_id, |geometry| {
        query.to_request(geometry)
    })
    .await
    {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };
    run_analysis(&state, &request).await
}

/// GET /analysis/gladalerts - confirmed-alert statistics for a geostore.
pub async fn glad_alerts_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<GladAlertsQuery>,
) -> Response {
    metrics::counter!("analysis_requests_total", "endpoint" => "gladalerts").increment(1);
    let request = match resolve_request(&state, &query.geostore_id, |geometry| {
        query.to_request(geometry)
    })
    .await
    {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };
    run_analysis(&state, &request).await
}

/// Resolve the geostore entry, enforce the size limit, and build the core
/// request.
async fn resolve_request<F>(
    state: &AppState,
    geostore_id: &str,
    build: F,
) -> ZonalResult<AnalysisRequest>
where
    F: FnOnce(zonal_common::Polygon) -> ZonalResult<AnalysisRequest>,
{
    let geostore = state.geostore.fetch(geostore_id).await?;

    // Large geometries would need the tiled execution path; refuse them.
    if geostore.area_ha >= state.max_area_ha {
        return Err(ZonalError::AreaTooLarge {
            area_ha: geostore.area_ha,
            limit_ha: state.max_area_ha,
        });
    }

    build(geostore.geometry)
}

async fn run_analysis(state: &AppState, request: &AnalysisRequest) -> Response {
    match state.engine.analyze(request).await {
        Ok(result) => {
            let body = AnalysisResponse::new(decorate_result(&result));
            json_response(StatusCode::OK, &body)
        }
        Err(e) => {
            let mapped = map_core_error(e);
            warn!(error = %mapped, "analysis failed");
            error_response(&mapped)
        }
    }
}

/// Map core engine errors onto request-level errors and status codes.
fn map_core_error(err: GeoprocessingError) -> ZonalError {
    match err {
        GeoprocessingError::DataNotAvailable(raster_id) => {
            ZonalError::DataNotAvailable(raster_id)
        }
        GeoprocessingError::InvalidGeometry(e) => ZonalError::InvalidGeometry(e.to_string()),
        GeoprocessingError::EmptyWindow(e) => ZonalError::InvalidGeometry(e.to_string()),
        GeoprocessingError::Storage(e) => ZonalError::StorageError(e.to_string()),
        other => ZonalError::InternalError(other.to_string()),
    }
}

fn error_response(err: &ZonalError) -> Response {
    metrics::counter!(
        "analysis_errors_total",
        "status" => err.http_status_code().to_string()
    )
    .increment(1);
    let exc = ExceptionResponse::from(err);
    json_response(
        StatusCode::from_u16(exc.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        &exc,
    )
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    let json = serde_json::to_string(body).unwrap_or_default();
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(json.into())
        .unwrap_or_default()
}
