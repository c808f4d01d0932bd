//! Fetch and decode one raster into a display-ready tile.

use std::sync::Arc;

use geotiff_parser::parse_grid;
use metrics::counter;
use raster_common::{BoundingBox, CacheKey, SpatialMeta, TimeCodec, UrlTemplates};
use storage::RasterFetcher;
use tracing::{debug, warn};

use crate::state::IndicatorState;
use crate::types::{RasterTile, TileOutcome};

/// Turns a cache key into a [`TileOutcome`].
///
/// Every failure (transport, HTTP status, malformed TIFF) is logged and
/// becomes [`TileOutcome::Missing`]; nothing is retried.
pub struct RasterDecoder {
    fetcher: Arc<dyn RasterFetcher>,
    templates: UrlTemplates,
    codec: TimeCodec,
    bbox: BoundingBox,
    state: Arc<IndicatorState>,
}

impl RasterDecoder {
    pub fn new(
        fetcher: Arc<dyn RasterFetcher>,
        templates: UrlTemplates,
        codec: TimeCodec,
        bbox: BoundingBox,
        state: Arc<IndicatorState>,
    ) -> Self {
        Self {
            fetcher,
            templates,
            codec,
            bbox,
            state,
        }
    }

    /// URL of the raster behind `key`.
    pub fn url_for(&self, key: CacheKey) -> String {
        self.templates
            .raster_url(key.indicator, self.codec.to_calendar(key.index))
    }

    pub async fn decode(&self, key: CacheKey) -> TileOutcome {
        let url = self.url_for(key);

        let bytes = match self.fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                counter!("raster_fetch_failures_total").increment(1);
                if e.is_not_found() {
                    debug!(key = %key, url = %url, "No raster for month");
                } else {
                    warn!(key = %key, url = %url, error = %e, "Raster fetch failed");
                }
                return TileOutcome::Missing;
            }
        };

        // TIFF decoding and compositing are CPU bound
        let state = Arc::clone(&self.state);
        let bbox = self.bbox;
        let decoded = tokio::task::spawn_blocking(move || {
            let grid = parse_grid(&bytes)?;
            state.capture_meta(
                key.indicator,
                SpatialMeta::new(bbox, grid.width(), grid.height()),
            );
            // Read the range as late as possible so a concurrent range
            // change is either seen here or rechained onto this entry.
            let range = state.range(key.indicator);
            Ok::<_, geotiff_parser::GeoTiffError>(RasterTile::render(
                key.indicator,
                key.index,
                grid,
                range,
            ))
        })
        .await;

        match decoded {
            Ok(Ok(tile)) => {
                counter!("raster_decodes_total").increment(1);
                debug!(
                    key = %key,
                    width = tile.grid.width(),
                    height = tile.grid.height(),
                    "Decoded raster"
                );
                TileOutcome::Ready(Arc::new(tile))
            }
            Ok(Err(e)) => {
                warn!(key = %key, url = %url, error = %e, "Raster decode failed");
                TileOutcome::Missing
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Decode task failed");
                TileOutcome::Missing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_common::{Indicator, TimeIndex};
    use storage::MemoryFetcher;
    use test_utils::fixtures::encode_float_tiff;

    fn decoder(fetcher: Arc<MemoryFetcher>, state: Arc<IndicatorState>) -> RasterDecoder {
        RasterDecoder::new(
            fetcher,
            UrlTemplates::with_base("mem://archive"),
            TimeCodec::default(),
            BoundingBox::default(),
            state,
        )
    }

    #[test]
    fn test_url_for_key() {
        let d = decoder(Arc::new(MemoryFetcher::new()), Arc::new(IndicatorState::new()));
        let key = CacheKey::new(Indicator::Ndwi, TimeIndex(13));
        assert_eq!(d.url_for(key), "mem://archive/ndwi/ndwi_2017_02.tif");
    }

    #[tokio::test]
    async fn test_decode_captures_meta() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert(
            "mem://archive/ndvi/ndvi_2016_01.tif",
            encode_float_tiff(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 3, 2, None),
        );
        let state = Arc::new(IndicatorState::new());
        let d = decoder(fetcher, Arc::clone(&state));

        let outcome = d.decode(CacheKey::new(Indicator::Ndvi, TimeIndex(0))).await;
        let tile = outcome.tile().expect("tile");
        assert_eq!(tile.grid.width(), 3);
        assert_eq!(tile.image.dimensions(), (3, 2));

        let meta = state.meta(Indicator::Ndvi).unwrap();
        assert_eq!((meta.width, meta.height), (3, 2));
    }

    #[tokio::test]
    async fn test_missing_and_garbage_collapse_to_missing() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert("mem://archive/ndvi/ndvi_2016_02.tif", b"<html>".to_vec());
        fetcher.fail("mem://archive/ndvi/ndvi_2016_03.tif");
        let state = Arc::new(IndicatorState::new());
        let d = decoder(fetcher, Arc::clone(&state));

        for index in 0..3 {
            let key = CacheKey::new(Indicator::Ndvi, TimeIndex(index));
            assert!(d.decode(key).await.is_missing());
        }
        assert!(state.meta(Indicator::Ndvi).is_none());
    }
}
