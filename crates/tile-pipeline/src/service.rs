//! High-level raster service.
//!
//! `RasterService` ties the pipeline together for the HTTP service and the
//! CLI: it owns the raster cache, the per-indicator state and the fetcher,
//! and exposes rendering, sampling, legends and range changes.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = RasterService::from_config(PipelineConfig::load(None)?)?;
//!
//! let outcome = service.render(Indicator::Ndvi, TimeIndex(42)).await?;
//! service.set_range(Indicator::Ndvi, 0.0, 0.8)?;
//! let series = service
//!     .sample_time_series(Indicator::Ndvi, point, |done, total| {})
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use futures::FutureExt;
use metrics::counter;
use raster_common::{
    BoundingBox, CacheKey, ColorRange, GeoPoint, Indicator, RasterError, RasterResult,
    SpatialMeta, SummaryRecord, SummarySeries, TimeCodec, TimeIndex, UrlTemplates, Viewport,
};
use renderer::{encode_png, legend_image, legend_strip, Palette};
use storage::{CacheStats, Lookup, RasterCache, RasterFetcher, SharedEntry, UrlFetcher};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::decoder::RasterDecoder;
use crate::error::PipelineError;
use crate::prefetch::Prefetcher;
use crate::sampler::PixelSampler;
use crate::state::IndicatorState;
use crate::types::{IndicatorInfo, Legend, SeriesPoint, TileOutcome};

type SummaryCell = Arc<OnceCell<Arc<SummarySeries>>>;

/// Entry point for every raster operation.
pub struct RasterService {
    config: PipelineConfig,
    codec: TimeCodec,
    templates: UrlTemplates,
    total_months: u32,
    fetcher: Arc<dyn RasterFetcher>,
    cache: Arc<RasterCache<TileOutcome>>,
    decoder: Arc<RasterDecoder>,
    state: Arc<IndicatorState>,
    prefetcher: Prefetcher,
    sampler: PixelSampler,
    /// Indicator whose rasters are currently cached.
    active: RwLock<Option<Indicator>>,
    summaries: Mutex<HashMap<Indicator, SummaryCell>>,
}

impl RasterService {
    /// Create a service over an explicit fetcher.
    pub fn new(config: PipelineConfig, fetcher: Arc<dyn RasterFetcher>) -> Self {
        let codec = config.codec();
        let templates = config.templates();
        let total_months = config.total_months();
        let state = Arc::new(IndicatorState::new());
        let decoder = Arc::new(RasterDecoder::new(
            Arc::clone(&fetcher),
            templates.clone(),
            codec,
            config.bbox,
            Arc::clone(&state),
        ));

        info!(
            epoch = %config.epoch,
            total_months,
            raster_template = %templates.raster,
            prefetch_radius = config.prefetch_radius,
            sampler_pool_size = config.sampler_pool_size,
            "Raster service initialized"
        );

        Self {
            prefetcher: Prefetcher::new(config.prefetch_radius),
            sampler: PixelSampler::new(config.sampler_pool_size),
            config,
            codec,
            templates,
            total_months,
            fetcher,
            cache: Arc::new(RasterCache::new()),
            decoder,
            state,
            active: RwLock::new(None),
            summaries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a service fetching over HTTP(S) or from disk, by URL scheme.
    pub fn from_config(config: PipelineConfig) -> crate::error::Result<Self> {
        let fetcher = UrlFetcher::new(config.fetch_timeout())?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn codec(&self) -> TimeCodec {
        self.codec
    }

    pub fn total_months(&self) -> u32 {
        self.total_months
    }

    pub fn bbox(&self) -> BoundingBox {
        self.config.bbox
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn active_indicator(&self) -> Option<Indicator> {
        *self.active.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn spatial_meta(&self, indicator: Indicator) -> Option<SpatialMeta> {
        self.state.meta(indicator)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Every indicator with its current range.
    pub fn indicators(&self) -> Vec<IndicatorInfo> {
        Indicator::ALL
            .iter()
            .map(|&indicator| IndicatorInfo {
                indicator,
                title: indicator.title(),
                unit: indicator.unit(),
                default_range: indicator.default_range(),
                range: self.state.range(indicator),
                total_months: self.total_months,
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Display the raster for `(indicator, index)`, then warm its neighbours.
    ///
    /// Switching to a different indicator drops every cached raster first.
    #[instrument(skip_all, fields(indicator = %indicator, index = %index))]
    pub async fn render(&self, indicator: Indicator, index: TimeIndex) -> RasterResult<TileOutcome> {
        self.check_index(index)?;
        self.activate(indicator);

        let outcome = self.lookup(CacheKey::new(indicator, index)).await;
        self.prefetch(indicator, index);
        Ok(outcome)
    }

    /// Render and encode as PNG. `None` when the month is missing.
    pub async fn render_png(
        &self,
        indicator: Indicator,
        index: TimeIndex,
    ) -> RasterResult<Option<Vec<u8>>> {
        match self.render(indicator, index).await? {
            TileOutcome::Ready(tile) => encode_png(&tile.image)
                .map(Some)
                .map_err(|e| RasterError::InternalError(format!("PNG encoding failed: {}", e))),
            TileOutcome::Missing => Ok(None),
        }
    }

    /// Warm the months around `index` on background tasks.
    pub fn prefetch(&self, indicator: Indicator, index: TimeIndex) -> Vec<JoinHandle<()>> {
        self.prefetcher.warm(index, self.total_months, |neighbour| {
            self.lookup(CacheKey::new(indicator, neighbour)).boxed()
        })
    }

    fn check_index(&self, index: TimeIndex) -> RasterResult<()> {
        if index.value() >= self.total_months {
            return Err(RasterError::InvalidParameter {
                param: "index".to_string(),
                message: format!(
                    "{} is outside the archive (0..{})",
                    index, self.total_months
                ),
            });
        }
        Ok(())
    }

    fn activate(&self, indicator: Indicator) {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        if *active == Some(indicator) {
            return;
        }
        if let Some(previous) = *active {
            let dropped = self.cache.clear_all();
            info!(
                from = %previous,
                to = %indicator,
                dropped,
                "Active indicator changed, cache cleared"
            );
        }
        *active = Some(indicator);
    }

    /// Cache entry for `key`, installing a decode if absent.
    fn lookup(&self, key: CacheKey) -> SharedEntry<TileOutcome> {
        let decoder = Arc::clone(&self.decoder);
        let (entry, lookup) = self
            .cache
            .get_tracked(key, move || async move { decoder.decode(key).await });

        match lookup {
            Lookup::Hit => counter!("raster_cache_hits_total").increment(1),
            Lookup::Miss => counter!("raster_cache_misses_total").increment(1),
        }
        entry
    }

    // ------------------------------------------------------------------------
    // Sampling
    // ------------------------------------------------------------------------

    /// Value of the pixel under `point` in every archived month.
    ///
    /// The first raster that decodes defines the grid size. If none has
    /// decoded yet, months are tried from the newest backwards until one
    /// does.
    #[instrument(skip_all, fields(indicator = %indicator))]
    pub async fn sample_time_series<P>(
        &self,
        indicator: Indicator,
        point: GeoPoint,
        progress: P,
    ) -> RasterResult<Vec<SeriesPoint>>
    where
        P: FnMut(usize, usize),
    {
        if !self.config.bbox.contains(point) {
            return Err(RasterError::OutOfArea {
                lng: point.lng,
                lat: point.lat,
            });
        }

        self.activate(indicator);
        let meta = match self.state.meta(indicator) {
            Some(meta) => meta,
            None => self.discover_meta(indicator).await?,
        };

        let series = self
            .sampler
            .sample(
                &meta,
                point,
                self.total_months,
                |index| self.lookup(CacheKey::new(indicator, index)),
                progress,
            )
            .await?;

        Ok(series
            .into_iter()
            .map(|(index, value)| {
                let month = self.codec.to_calendar(index);
                SeriesPoint {
                    index,
                    year: month.year,
                    month: month.month,
                    value,
                }
            })
            .collect())
    }

    async fn discover_meta(&self, indicator: Indicator) -> RasterResult<SpatialMeta> {
        for index in (0..self.total_months).rev() {
            let outcome = self.lookup(CacheKey::new(indicator, TimeIndex(index))).await;
            if !outcome.is_missing() {
                if let Some(meta) = self.state.meta(indicator) {
                    return Ok(meta);
                }
            }
            debug!(indicator = %indicator, index, "No raster to georeference from");
        }
        Err(RasterError::DataNotAvailable(format!(
            "no {} raster could be decoded",
            indicator
        )))
    }

    // ------------------------------------------------------------------------
    // Ranges and legends
    // ------------------------------------------------------------------------

    pub fn range(&self, indicator: Indicator) -> ColorRange {
        self.state.range(indicator)
    }

    /// Change an indicator's display range and recolor its cached rasters.
    ///
    /// Invalid ranges are rejected before anything changes. Returns the number
    /// of cache entries rechained.
    pub fn set_range(&self, indicator: Indicator, min: f32, max: f32) -> RasterResult<usize> {
        let range = ColorRange::validated(min, max)?;
        Ok(self.apply_range(indicator, range))
    }

    /// [`RasterService::set_range`] for user-entered text.
    pub fn set_range_str(&self, indicator: Indicator, min: &str, max: &str) -> RasterResult<usize> {
        let range = ColorRange::parse(min, max)?;
        Ok(self.apply_range(indicator, range))
    }

    /// Restore the default range.
    pub fn reset_range(&self, indicator: Indicator) -> usize {
        let range = self.state.reset_range(indicator);
        self.recolor_cached(indicator, range)
    }

    fn apply_range(&self, indicator: Indicator, range: ColorRange) -> usize {
        self.state.set_range(indicator, range);
        self.recolor_cached(indicator, range)
    }

    /// Chain a recolor onto every cached entry of `indicator`. Grids are
    /// reused; nothing is fetched.
    fn recolor_cached(&self, indicator: Indicator, range: ColorRange) -> usize {
        let rechained = self.cache.rechain(
            |key| key.indicator == indicator,
            move |_, source| {
                source
                    .then(move |outcome| recolor_off_runtime(outcome, range))
                    .boxed()
            },
        );
        info!(
            indicator = %indicator,
            min = range.min,
            max = range.max,
            rechained,
            "Color range changed"
        );
        rechained
    }

    /// Legend colors for the current range, `length` samples from max to min.
    pub fn legend(&self, indicator: Indicator, length: usize) -> Legend {
        let range = self.state.range(indicator);
        let strip = legend_strip(&range, &Palette::for_indicator(indicator), length);
        Legend {
            indicator,
            min: range.min,
            max: range.max,
            unit: indicator.unit(),
            colors: strip.iter().map(|c| c.to_hex()).collect(),
        }
    }

    /// Legend bar as PNG.
    pub fn legend_png(&self, indicator: Indicator, width: u32, height: u32) -> RasterResult<Vec<u8>> {
        let range = self.state.range(indicator);
        let image = legend_image(&range, &Palette::for_indicator(indicator), width, height);
        encode_png(&image)
            .map_err(|e| RasterError::InternalError(format!("PNG encoding failed: {}", e)))
    }

    // ------------------------------------------------------------------------
    // Area summaries
    // ------------------------------------------------------------------------

    /// Area statistics for one month, from the indicator's summary series.
    pub async fn area_summary(
        &self,
        indicator: Indicator,
        index: TimeIndex,
    ) -> RasterResult<Option<SummaryRecord>> {
        self.check_index(index)?;
        let series = self.summary_series(indicator).await?;
        Ok(series.at(&self.codec, index).copied())
    }

    /// The indicator's summary series, fetched once and then kept.
    ///
    /// A failed fetch is not remembered; the next call tries again.
    pub async fn summary_series(&self, indicator: Indicator) -> RasterResult<Arc<SummarySeries>> {
        let cell = {
            let mut summaries = self.summaries.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(summaries.entry(indicator).or_default())
        };

        let series = cell
            .get_or_try_init(|| async {
                let url = self.templates.summary_url(indicator);
                let bytes = self.fetcher.fetch(&url).await.map_err(PipelineError::from)?;
                let series = SummarySeries::from_json(&bytes).map_err(PipelineError::from)?;
                info!(
                    indicator = %indicator,
                    records = series.len(),
                    "Loaded area summary"
                );
                Ok::<_, PipelineError>(Arc::new(series))
            })
            .await?;

        Ok(Arc::clone(series))
    }
}

/// Composite `outcome` for `range` on the blocking pool.
async fn recolor_off_runtime(outcome: TileOutcome, range: ColorRange) -> TileOutcome {
    let tile = match outcome {
        TileOutcome::Ready(tile) => tile,
        TileOutcome::Missing => return TileOutcome::Missing,
    };
    let previous = Arc::clone(&tile);
    match tokio::task::spawn_blocking(move || tile.recolored(range)).await {
        Ok(recolored) => TileOutcome::Ready(Arc::new(recolored)),
        Err(e) => {
            warn!(
                key = %CacheKey::new(previous.indicator, previous.index),
                error = %e,
                "Recolor task failed, keeping previous image"
            );
            TileOutcome::Ready(previous)
        }
    }
}
