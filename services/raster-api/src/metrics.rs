//! Application metrics registration and reporting.

use anyhow::Result;
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use storage::CacheStats;

/// Install the Prometheus recorder and describe the pipeline's metrics.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

pub fn describe_metrics() {
    describe_counter!("raster_cache_hits_total", "Raster lookups served from the cache");
    describe_counter!("raster_cache_misses_total", "Raster lookups that started a fetch");
    describe_counter!(
        "raster_fetch_failures_total",
        "Raster fetches that failed or found no data"
    );
    describe_counter!("raster_decodes_total", "Rasters decoded and colorized");
    describe_gauge!("raster_cache_entries", "Entries in the raster cache");
}

/// Publish cache gauges ahead of a scrape.
pub fn record_cache_stats(stats: &CacheStats) {
    gauge!("raster_cache_entries").set(stats.entries as f64);
}
