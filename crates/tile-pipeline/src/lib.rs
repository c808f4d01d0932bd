//! Raster tile pipeline for monthly vegetation and surface indices.
//!
//! Turns `(indicator, month)` requests into colorized overlays, with a
//! deduplicating in-memory cache in front of the network:
//!
//! ```text
//! render(indicator, index)
//!      │
//!      ▼
//! RasterCache::get(key) ──► hit: shared future (pending or settled)
//!      │
//!      └─► miss: RasterDecoder::decode(key)
//!                 │
//!                 ├─► URL from template + time codec
//!                 ├─► RasterFetcher (HTTP / file)
//!                 ├─► GeoTIFF → DecodedGrid
//!                 └─► Compositor → RGBA image
//!      │
//!      ▼
//! Prefetcher warms T±radius in the background
//! ```
//!
//! Color range changes rechain cached entries so only the image is
//! recomputed. The pixel sampler walks the whole archive in bounded waves
//! through the same cache.

pub mod config;
pub mod decoder;
pub mod error;
pub mod prefetch;
pub mod sampler;
pub mod service;
pub mod state;
pub mod types;

pub use config::PipelineConfig;
pub use decoder::RasterDecoder;
pub use error::{PipelineError, Result};
pub use prefetch::Prefetcher;
pub use sampler::PixelSampler;
pub use service::RasterService;
pub use state::IndicatorState;
pub use types::{IndicatorInfo, Legend, RasterTile, SeriesPoint, TileOutcome};
