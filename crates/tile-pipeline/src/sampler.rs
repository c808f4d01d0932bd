//! Time series extraction for a single pixel.
//!
//! Months are fetched in waves of `pool_size`: each wave is awaited with
//! `join_all` before the next one starts, bounding the number of in-flight
//! fetches without a semaphore.

use std::future::Future;

use futures::future::join_all;
use raster_common::{GeoPoint, RasterResult, SpatialMeta, TimeIndex};
use tracing::debug;

use crate::types::TileOutcome;

#[derive(Debug, Clone, Copy)]
pub struct PixelSampler {
    pool_size: usize,
}

impl Default for PixelSampler {
    fn default() -> Self {
        Self::new(8)
    }
}

impl PixelSampler {
    /// A pool size of zero is treated as one.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size: pool_size.max(1),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Sample `point` in every month of `[0, total_months)`.
    ///
    /// Returns one entry per month in index order. Missing months and
    /// non-finite samples are `None`. `progress(done, total)` is called after
    /// each month settles. Fails only when `point` is outside the area.
    pub async fn sample<F, Fut, P>(
        &self,
        meta: &SpatialMeta,
        point: GeoPoint,
        total_months: u32,
        lookup: F,
        mut progress: P,
    ) -> RasterResult<Vec<(TimeIndex, Option<f32>)>>
    where
        F: Fn(TimeIndex) -> Fut,
        Fut: Future<Output = TileOutcome>,
        P: FnMut(usize, usize),
    {
        let offset = meta.offset_of(point)?;
        let total = total_months as usize;
        let worklist: Vec<TimeIndex> = (0..total_months).map(TimeIndex).collect();

        let mut series = Vec::with_capacity(total);
        for wave in worklist.chunks(self.pool_size) {
            let outcomes = join_all(wave.iter().map(|&index| lookup(index))).await;

            for (&index, outcome) in wave.iter().zip(outcomes) {
                let value = outcome.tile().and_then(|tile| tile.value_at(offset));
                series.push((index, value));
                progress(series.len(), total);
            }
        }

        debug!(
            total,
            present = series.iter().filter(|(_, v)| v.is_some()).count(),
            "Sampled pixel series"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RasterTile;
    use raster_common::{BoundingBox, ColorRange, DecodedGrid, Indicator, RasterError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn meta() -> SpatialMeta {
        SpatialMeta::new(BoundingBox::new(0.0, 0.0, 2.0, 2.0), 2, 2)
    }

    fn tile(index: TimeIndex, data: Vec<f32>) -> TileOutcome {
        let grid = DecodedGrid::new(data, 2, 2).unwrap();
        TileOutcome::Ready(Arc::new(RasterTile::render(
            Indicator::Ndvi,
            index,
            grid,
            ColorRange::new(0.0, 1.0),
        )))
    }

    #[tokio::test]
    async fn test_out_of_area_does_not_look_up() {
        let calls = AtomicUsize::new(0);
        let err = PixelSampler::new(4)
            .sample(
                &meta(),
                GeoPoint::new(-1.0, 1.0),
                12,
                |index| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { tile(index, vec![0.0; 4]) }
                },
                |_, _| {},
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RasterError::OutOfArea { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reads_pixel_and_maps_missing_to_none() {
        // North-east pixel is offset 1
        let point = GeoPoint::new(1.5, 1.5);
        let series = PixelSampler::new(2)
            .sample(
                &meta(),
                point,
                4,
                |index| async move {
                    match index.value() {
                        1 => TileOutcome::Missing,
                        2 => tile(index, vec![0.0, f32::NAN, 0.0, 0.0]),
                        v => tile(index, vec![0.0, v as f32 / 10.0, 0.0, 0.0]),
                    }
                },
                |_, _| {},
            )
            .await
            .unwrap();

        assert_eq!(
            series,
            vec![
                (TimeIndex(0), Some(0.0)),
                (TimeIndex(1), None),
                (TimeIndex(2), None),
                (TimeIndex(3), Some(0.3)),
            ]
        );
    }

    #[tokio::test]
    async fn test_progress_reports_every_month() {
        let mut seen = Vec::new();
        PixelSampler::new(3)
            .sample(
                &meta(),
                GeoPoint::new(0.5, 0.5),
                7,
                |index| async move { tile(index, vec![1.0; 4]) },
                |done, total| seen.push((done, total)),
            )
            .await
            .unwrap();

        let expected: Vec<(usize, usize)> = (1..=7).map(|d| (d, 7)).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_zero_months_is_empty() {
        let series = PixelSampler::default()
            .sample(
                &meta(),
                GeoPoint::new(0.5, 0.5),
                0,
                |index| async move { tile(index, vec![1.0; 4]) },
                |_, _| {},
            )
            .await
            .unwrap();
        assert!(series.is_empty());
    }
}
