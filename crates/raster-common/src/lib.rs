//! Common types shared across the raster pipeline crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod indicator;
pub mod range;
pub mod summary;
pub mod time;
pub mod url;

pub use bbox::{BoundingBox, GeoPoint, SpatialMeta, Viewport};
pub use error::{RasterError, RasterResult};
pub use grid::DecodedGrid;
pub use indicator::{CacheKey, Indicator};
pub use range::ColorRange;
pub use summary::{SummaryRecord, SummarySeries};
pub use time::{TimeCodec, TimeIndex, YearMonth};
pub use url::UrlTemplates;
