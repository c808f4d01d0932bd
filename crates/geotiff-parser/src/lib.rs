//! GeoTIFF parser for the monthly index rasters.
//!
//! The upstream pipeline writes one Cloud Optimized GeoTIFF per indicator and
//! month: a single float32 band, deflate-compressed, with the GDAL nodata tag
//! set where the scene was masked. This crate decodes such a file from memory
//! into a [`DecodedGrid`], turning nodata samples into NaN.
//!
//! Georeferencing tags are not read: the area's bounding box is fixed by
//! configuration and only the grid size is taken from the file.

pub mod decode;
pub mod error;

pub use decode::{parse_grid, parse_grid_file, GDAL_NODATA_TAG};
pub use error::{GeoTiffError, GeoTiffResult};
pub use raster_common::DecodedGrid;
