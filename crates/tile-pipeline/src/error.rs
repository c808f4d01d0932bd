//! Error types for the tile pipeline.

use raster_common::RasterError;
use storage::FetchError;
use thiserror::Error;

/// Errors raised while loading configuration or auxiliary resources.
///
/// Raster fetch and decode failures never surface here; the decoder turns
/// them into a missing tile.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to read a configuration file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML configuration.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Transport failure for a non-raster resource.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Malformed summary JSON.
    #[error("invalid summary document: {0}")]
    Summary(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<PipelineError> for RasterError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Fetch(e) if e.is_not_found() => {
                RasterError::DataNotAvailable(e.to_string())
            }
            PipelineError::Fetch(e) => RasterError::DataReadError(e.to_string()),
            PipelineError::Summary(e) => RasterError::DataReadError(e.to_string()),
            other => RasterError::ConfigError(other.to_string()),
        }
    }
}

/// Result type for pipeline setup operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
