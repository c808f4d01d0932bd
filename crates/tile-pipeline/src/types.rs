//! Types flowing through the raster cache.

use std::sync::Arc;

use image::RgbaImage;
use raster_common::{ColorRange, DecodedGrid, Indicator, TimeIndex};
use renderer::{composite_grid, Palette};
use serde::Serialize;

/// A decoded raster and its display image.
///
/// The grid is shared and never changes once decoded. The image is replaced
/// wholesale when the indicator's color range changes.
#[derive(Debug, Clone)]
pub struct RasterTile {
    pub indicator: Indicator,
    pub index: TimeIndex,
    pub grid: Arc<DecodedGrid>,
    pub image: Arc<RgbaImage>,
    /// Range the image was rendered with.
    pub range: ColorRange,
}

impl RasterTile {
    /// Composite a freshly decoded grid.
    pub fn render(
        indicator: Indicator,
        index: TimeIndex,
        grid: DecodedGrid,
        range: ColorRange,
    ) -> Self {
        let image = composite_grid(&grid, &range, &Palette::for_indicator(indicator));
        Self {
            indicator,
            index,
            grid: Arc::new(grid),
            image: Arc::new(image),
            range,
        }
    }

    /// Same grid, new image for `range`.
    pub fn recolored(&self, range: ColorRange) -> Self {
        let palette = Palette::for_indicator(self.indicator);
        Self {
            indicator: self.indicator,
            index: self.index,
            grid: Arc::clone(&self.grid),
            image: Arc::new(composite_grid(&self.grid, &range, &palette)),
            range,
        }
    }

    /// Sample at a row-major offset; non-finite values are `None`.
    pub fn value_at(&self, offset: usize) -> Option<f32> {
        self.grid.data().get(offset).copied().filter(|v| v.is_finite())
    }
}

/// Settled value of a cache entry.
#[derive(Debug, Clone)]
pub enum TileOutcome {
    Ready(Arc<RasterTile>),
    /// Month has no data, or fetching/decoding it failed.
    Missing,
}

impl TileOutcome {
    pub fn is_missing(&self) -> bool {
        matches!(self, TileOutcome::Missing)
    }

    pub fn tile(&self) -> Option<&Arc<RasterTile>> {
        match self {
            TileOutcome::Ready(tile) => Some(tile),
            TileOutcome::Missing => None,
        }
    }

    /// Re-render the image for `range`. Missing stays missing.
    pub fn recolored(&self, range: ColorRange) -> TileOutcome {
        match self {
            TileOutcome::Ready(tile) => TileOutcome::Ready(Arc::new(tile.recolored(range))),
            TileOutcome::Missing => TileOutcome::Missing,
        }
    }
}

/// One point of a pixel time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub index: TimeIndex,
    pub year: i32,
    pub month: u32,
    pub value: Option<f32>,
}

/// Legend for an indicator's current range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub indicator: Indicator,
    pub min: f32,
    pub max: f32,
    pub unit: &'static str,
    /// Hex colors from max (first) to min (last).
    pub colors: Vec<String>,
}

/// Description of an indicator for clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorInfo {
    pub indicator: Indicator,
    pub title: &'static str,
    pub unit: &'static str,
    pub default_range: ColorRange,
    pub range: ColorRange,
    pub total_months: u32,
}
