//! Raster cache statistics.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use tracing::instrument;

use crate::state::AppState;

/// GET /api/cache/stats - Raster cache counters
#[instrument(skip(state))]
pub async fn cache_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let stats = state.service.cache_stats();
    Json(serde_json::json!({
        "active_indicator": state.service.active_indicator(),
        "entries": stats.entries,
        "hits": stats.hits,
        "misses": stats.misses,
        "hit_rate": stats.hit_rate(),
        "rechained": stats.rechained,
        "clears": stats.clears
    }))
}
