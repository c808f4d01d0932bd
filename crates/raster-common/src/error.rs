//! Error types for the raster pipeline.
//!
//! Missing months are not errors: they flow through the cache as
//! `TileOutcome::Missing`. The variants here are the faults that are reported
//! to a caller.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Primary error type for raster operations.
#[derive(Debug, Error)]
pub enum RasterError {
    // === Input Errors ===
    #[error("Invalid value range: {0}")]
    InvalidRange(String),

    #[error("Point ({lng}, {lat}) is outside the area")]
    OutOfArea { lng: f64, lat: f64 },

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Errors ===
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RasterError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            RasterError::InvalidRange(_)
            | RasterError::OutOfArea { .. }
            | RasterError::InvalidParameter { .. } => 400,

            RasterError::UnknownIndicator(_) | RasterError::DataNotAvailable(_) => 404,

            RasterError::DataReadError(_) => 502,

            _ => 500,
        }
    }

    /// True for faults caused by the caller's input.
    pub fn is_user_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

impl From<crate::indicator::UnknownIndicator> for RasterError {
    fn from(err: crate::indicator::UnknownIndicator) -> Self {
        RasterError::UnknownIndicator(err.0)
    }
}

impl From<serde_json::Error> for RasterError {
    fn from(err: serde_json::Error) -> Self {
        RasterError::DataReadError(format!("JSON error: {}", err))
    }
}
