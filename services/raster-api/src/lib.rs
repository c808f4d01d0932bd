//! HTTP service for the monthly index raster pipeline.
//!
//! Exposes the router and handlers so they can be exercised in tests
//! without binding a socket.

pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // API endpoints
        .route("/api/indicators", get(handlers::indicators_handler))
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        // Rasters
        .route("/render/:indicator/:index", get(handlers::render_handler))
        .route("/timeseries/:indicator", get(handlers::timeseries_handler))
        .route("/summary/:indicator/:index", get(handlers::summary_handler))
        // Legends and ranges
        .route("/legend/:indicator", get(handlers::legend_handler))
        .route("/legend/:indicator/png", get(handlers::legend_png_handler))
        .route(
            "/range/:indicator",
            put(handlers::put_range_handler).delete(handlers::delete_range_handler),
        )
        // Layer extensions
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
