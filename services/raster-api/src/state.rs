//! Application state and shared resources.

use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use storage::RasterFetcher;
use tile_pipeline::{PipelineConfig, RasterService};

/// Shared application state.
pub struct AppState {
    pub service: RasterService,
    /// Present when the Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// State fetching rasters by URL scheme (HTTP or filesystem).
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            service: RasterService::from_config(config)?,
            prometheus: None,
        })
    }

    /// State over an explicit fetcher.
    pub fn with_fetcher(config: PipelineConfig, fetcher: Arc<dyn RasterFetcher>) -> Self {
        Self {
            service: RasterService::new(config, fetcher),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
