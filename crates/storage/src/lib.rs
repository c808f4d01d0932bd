//! Storage abstractions for the raster pipeline.
//!
//! Provides:
//! - Transports that fetch raster and summary resources (HTTP, filesystem, memory)
//! - The deduplicating raster cache keyed by (indicator, time index)

pub mod fetch;
pub mod raster_cache;

pub use fetch::{FetchError, FileFetcher, HttpFetcher, MemoryFetcher, RasterFetcher, UrlFetcher};
pub use raster_cache::{CacheStats, Lookup, RasterCache, SharedEntry};
