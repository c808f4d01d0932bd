//! Background warming of neighbouring months.

use futures::future::BoxFuture;
use raster_common::TimeIndex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::TileOutcome;

/// Warms the months around the displayed one.
#[derive(Debug, Clone, Copy)]
pub struct Prefetcher {
    radius: u32,
}

impl Default for Prefetcher {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Prefetcher {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Indices within `radius` of `center`, excluding it, inside
    /// `[0, total_months)`. Nearest first.
    pub fn neighbours(&self, center: TimeIndex, total_months: u32) -> Vec<TimeIndex> {
        let mut out = Vec::with_capacity(self.radius as usize * 2);
        for distance in 1..=self.radius as i64 {
            for delta in [-distance, distance] {
                if let Some(index) = center.offset(delta) {
                    if index.value() < total_months {
                        out.push(index);
                    }
                }
            }
        }
        out
    }

    /// Start a detached task per neighbour driving `lookup(index)`.
    ///
    /// `lookup` should return the cache entry for the index so the result
    /// lands in the cache. Missing months are only logged. The handles are
    /// returned for callers that want to wait; dropping them does not cancel
    /// anything.
    pub fn warm<F>(&self, center: TimeIndex, total_months: u32, lookup: F) -> Vec<JoinHandle<()>>
    where
        F: Fn(TimeIndex) -> BoxFuture<'static, TileOutcome>,
    {
        self.neighbours(center, total_months)
            .into_iter()
            .map(|index| {
                let entry = lookup(index);
                tokio::spawn(async move {
                    if entry.await.is_missing() {
                        debug!(index = %index, "Prefetched month is missing");
                    }
                })
            })
            .collect()
    }
}
