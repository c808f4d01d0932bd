//! Indicator catalog endpoint.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use raster_common::{BoundingBox, Viewport, YearMonth};
use serde::Serialize;
use tile_pipeline::IndicatorInfo;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IndicatorsResponse {
    pub indicators: Vec<IndicatorInfo>,
    pub bbox: BoundingBox,
    pub viewport: Viewport,
    /// Month of time index 0.
    pub epoch: YearMonth,
    pub total_months: u32,
}

/// GET /api/indicators - Indicators, ranges and the archive extent
pub async fn indicators_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<IndicatorsResponse> {
    let service = &state.service;
    Json(IndicatorsResponse {
        indicators: service.indicators(),
        bbox: service.bbox(),
        viewport: service.viewport(),
        epoch: service.codec().epoch(),
        total_months: service.total_months(),
    })
}
