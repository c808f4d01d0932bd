//! Raster rendering, sampling, legend and range handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use raster_common::{GeoPoint, TimeIndex};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::common::{error_response, parse_indicator, png_response};
use crate::state::AppState;

// ============================================================================
// Rendering
// ============================================================================

/// GET /render/:indicator/:index - Colorized overlay PNG, 204 when missing
#[instrument(skip(state))]
pub async fn render_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((indicator, index)): Path<(String, u32)>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };

    match state.service.render_png(indicator, TimeIndex(index)).await {
        Ok(Some(png)) => png_response(png),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Time series
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PointParams {
    pub lng: f64,
    pub lat: f64,
}

/// GET /timeseries/:indicator?lng=&lat= - Pixel value in every month
#[instrument(skip(state))]
pub async fn timeseries_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(indicator): Path<String>,
    Query(params): Query<PointParams>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };

    let point = GeoPoint::new(params.lng, params.lat);
    match state
        .service
        .sample_time_series(indicator, point, |_, _| {})
        .await
    {
        Ok(series) => Json(series).into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Legend
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LegendParams {
    pub steps: Option<usize>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

const DEFAULT_LEGEND_STEPS: usize = 32;
const MAX_LEGEND_STEPS: usize = 1024;
const DEFAULT_LEGEND_SIZE: (u32, u32) = (24, 256);
const MAX_LEGEND_PIXELS: u32 = 2048;

/// GET /legend/:indicator - Legend colors for the current range
pub async fn legend_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(indicator): Path<String>,
    Query(params): Query<LegendParams>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let steps = params
        .steps
        .unwrap_or(DEFAULT_LEGEND_STEPS)
        .clamp(2, MAX_LEGEND_STEPS);

    Json(state.service.legend(indicator, steps)).into_response()
}

/// GET /legend/:indicator/png - Vertical legend bar
pub async fn legend_png_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(indicator): Path<String>,
    Query(params): Query<LegendParams>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    let width = params
        .width
        .unwrap_or(DEFAULT_LEGEND_SIZE.0)
        .clamp(1, MAX_LEGEND_PIXELS);
    let height = params
        .height
        .unwrap_or(DEFAULT_LEGEND_SIZE.1)
        .clamp(1, MAX_LEGEND_PIXELS);

    match state.service.legend_png(indicator, width, height) {
        Ok(png) => png_response(png),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Color range
// ============================================================================

/// A range bound as typed into a form (string) or sent by a script (number).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RangeBound {
    Number(f64),
    Text(String),
}

impl RangeBound {
    fn as_text(&self) -> String {
        match self {
            RangeBound::Number(n) => n.to_string(),
            RangeBound::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub min: RangeBound,
    pub max: RangeBound,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub indicator: String,
    pub min: f32,
    pub max: f32,
    /// Cached rasters recolored by this change.
    pub recolored: usize,
}

/// PUT /range/:indicator - Change the display range
#[instrument(skip(state))]
pub async fn put_range_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(indicator): Path<String>,
    Json(request): Json<RangeRequest>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };

    let recolored = match state.service.set_range_str(
        indicator,
        &request.min.as_text(),
        &request.max.as_text(),
    ) {
        Ok(n) => n,
        Err(e) => return error_response(&e),
    };

    let range = state.service.range(indicator);
    Json(RangeResponse {
        indicator: indicator.to_string(),
        min: range.min,
        max: range.max,
        recolored,
    })
    .into_response()
}

/// DELETE /range/:indicator - Restore the default range
#[instrument(skip(state))]
pub async fn delete_range_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(indicator): Path<String>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };

    let recolored = state.service.reset_range(indicator);
    let range = state.service.range(indicator);
    info!(indicator = %indicator, "Range reset to default");
    Json(RangeResponse {
        indicator: indicator.to_string(),
        min: range.min,
        max: range.max,
        recolored,
    })
    .into_response()
}

// ============================================================================
// Area summary
// ============================================================================

/// GET /summary/:indicator/:index - Area statistics for one month
#[instrument(skip(state))]
pub async fn summary_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((indicator, index)): Path<(String, u32)>,
) -> Response {
    let indicator = match parse_indicator(&indicator) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };

    match state.service.area_summary(indicator, TimeIndex(index)).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("no {} summary for index {}", indicator, index),
                "status": 404
            })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}
