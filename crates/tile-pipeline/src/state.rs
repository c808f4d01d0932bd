//! Per-indicator mutable state: current color ranges and captured
//! georeferencing.
//!
//! Locks here are never held across an await.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use raster_common::{ColorRange, Indicator, SpatialMeta};
use tracing::info;

#[derive(Debug, Default)]
pub struct IndicatorState {
    ranges: RwLock<HashMap<Indicator, ColorRange>>,
    metas: RwLock<HashMap<Indicator, SpatialMeta>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl IndicatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current range, or the indicator's default.
    pub fn range(&self, indicator: Indicator) -> ColorRange {
        read(&self.ranges)
            .get(&indicator)
            .copied()
            .unwrap_or_else(|| indicator.default_range())
    }

    pub fn set_range(&self, indicator: Indicator, range: ColorRange) {
        write(&self.ranges).insert(indicator, range);
    }

    /// Drop any override. Returns the (default) range now in effect.
    pub fn reset_range(&self, indicator: Indicator) -> ColorRange {
        write(&self.ranges).remove(&indicator);
        indicator.default_range()
    }

    pub fn meta(&self, indicator: Indicator) -> Option<SpatialMeta> {
        read(&self.metas).get(&indicator).copied()
    }

    /// Record georeferencing unless one is already known. Returns true if
    /// this call captured it.
    pub fn capture_meta(&self, indicator: Indicator, meta: SpatialMeta) -> bool {
        let mut metas = write(&self.metas);
        if metas.contains_key(&indicator) {
            return false;
        }
        info!(
            indicator = %indicator,
            width = meta.width,
            height = meta.height,
            "Captured raster georeferencing"
        );
        metas.insert(indicator, meta);
        true
    }
}
