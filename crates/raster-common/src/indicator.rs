//! Indicator definitions and cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::range::ColorRange;
use crate::time::TimeIndex;

/// One of the monthly raster variables published by the upstream pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// Normalized difference vegetation index
    Ndvi,
    /// Enhanced vegetation index
    Evi,
    /// Normalized difference water index
    Ndwi,
    /// Land surface temperature (°C)
    Lst,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Ndvi,
        Indicator::Evi,
        Indicator::Ndwi,
        Indicator::Lst,
    ];

    /// Short name used in URLs and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Ndvi => "ndvi",
            Indicator::Evi => "evi",
            Indicator::Ndwi => "ndwi",
            Indicator::Lst => "lst",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Indicator::Ndvi => "Vegetation index (NDVI)",
            Indicator::Evi => "Enhanced vegetation index (EVI)",
            Indicator::Ndwi => "Water index (NDWI)",
            Indicator::Lst => "Land surface temperature",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Indicator::Lst => "°C",
            _ => "",
        }
    }

    /// Physical value range used for coloring until the user edits it.
    pub fn default_range(&self) -> ColorRange {
        match self {
            Indicator::Ndvi => ColorRange::new(-0.2, 0.9),
            Indicator::Evi => ColorRange::new(-0.2, 0.8),
            Indicator::Ndwi => ColorRange::new(-0.5, 0.5),
            Indicator::Lst => ColorRange::new(0.0, 45.0),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = UnknownIndicator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndvi" => Ok(Indicator::Ndvi),
            "evi" => Ok(Indicator::Evi),
            "ndwi" => Ok(Indicator::Ndwi),
            "lst" => Ok(Indicator::Lst),
            _ => Err(UnknownIndicator(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown indicator: {0}")]
pub struct UnknownIndicator(pub String);

/// Identifies one raster tile: an indicator at a time index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub indicator: Indicator,
    pub index: TimeIndex,
}

impl CacheKey {
    pub fn new(indicator: Indicator, index: TimeIndex) -> Self {
        Self { indicator, index }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.indicator, self.index)
    }
}
