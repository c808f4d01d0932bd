//! HTTP request handlers.
//!
//! This module is organized into submodules:
//! - `raster`: rendering, time series, legends, color ranges, area summaries
//! - `api`: indicator catalog
//! - `cache`: raster cache statistics
//! - `metrics`: health check and Prometheus metrics
//! - `common`: shared utilities (error responses, path parsing)

pub mod api;
pub mod cache;
pub mod common;
pub mod metrics;
pub mod raster;

pub use api::{indicators_handler, IndicatorsResponse};
pub use cache::cache_stats_handler;
pub use common::{error_response, parse_indicator, ErrorResponse};
pub use metrics::{health_handler, metrics_handler};
pub use raster::{
    delete_range_handler, legend_handler, legend_png_handler, put_range_handler, render_handler,
    summary_handler, timeseries_handler, RangeBound, RangeRequest, RangeResponse,
};
