//! Error types for GeoTIFF parsing operations.

use thiserror::Error;

/// Result type for GeoTIFF parser operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Error types for GeoTIFF parsing.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The TIFF structure could not be decoded
    #[error("TIFF decoding failed: {0}")]
    Decode(#[from] tiff::TiffError),

    /// Image layout this parser does not handle (e.g. multi-band)
    #[error("Unsupported raster layout: {0}")]
    Unsupported(String),

    /// Sample count does not match the image dimensions
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
