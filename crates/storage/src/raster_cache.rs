//! Deduplicating cache of raster results.
//!
//! Each entry is a shared future keyed by [`CacheKey`]. The first caller for a
//! key installs the future; every later caller, including ones that arrive
//! while it is still running, awaits the same future. The producer therefore
//! runs at most once per key until the entry is removed.
//!
//! Entries are never evicted. The cache lives for the process, or until
//! [`RasterCache::clear_all`] drops everything (on indicator switch).
//!
//! ## Rechaining
//!
//! [`RasterCache::rechain`] replaces matching entries with a continuation of
//! the entry's original future. Callers who already hold the old handle keep
//! awaiting the old value; callers arriving afterwards see the transformed
//! one. The expensive part of the original future (the fetch and decode) is
//! not repeated.
//!
//! Continuations always start from the original future, never from a previous
//! continuation, so any number of rechains leaves every entry at most one
//! level deep.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use raster_common::CacheKey;
use serde::Serialize;
use tracing::debug;

/// A cache entry: a cloneable handle to a possibly still running future.
pub type SharedEntry<V> = Shared<BoxFuture<'static, V>>;

/// Whether a lookup found an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    Miss,
}

/// The producer's future and the handle currently served for a key.
struct Slot<V>
where
    V: Clone + Send + Sync + 'static,
{
    source: SharedEntry<V>,
    current: SharedEntry<V>,
}

/// Counters exposed on the stats endpoint.
#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    rechained: AtomicU64,
    clears: AtomicU64,
}

/// Snapshot of cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub rechained: u64,
    pub clears: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct RasterCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: Mutex<HashMap<CacheKey, Slot<V>>>,
    counters: CacheCounters,
}

impl<V> Default for RasterCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RasterCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            counters: CacheCounters::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the entry for `key`, installing `producer()` if absent.
    ///
    /// Lookup and insertion happen under a single lock, so concurrent callers
    /// for the same key can never both run the producer. `producer` only
    /// builds the future; it must not call back into this cache.
    pub fn get<F, Fut>(&self, key: CacheKey, producer: F) -> SharedEntry<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        self.get_tracked(key, producer).0
    }

    /// Like [`RasterCache::get`], also reporting whether the key was present.
    pub fn get_tracked<F, Fut>(&self, key: CacheKey, producer: F) -> (SharedEntry<V>, Lookup)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut entries = self.lock();
        if let Some(slot) = entries.get(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return (slot.current.clone(), Lookup::Hit);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Raster cache miss");
        let entry = producer().boxed().shared();
        entries.insert(
            key,
            Slot {
                source: entry.clone(),
                current: entry.clone(),
            },
        );
        (entry, Lookup::Miss)
    }

    /// The entry for `key` if present, without installing anything.
    pub fn entry(&self, key: &CacheKey) -> Option<SharedEntry<V>> {
        self.lock().get(key).map(|slot| slot.current.clone())
    }

    /// The value for `key` if its future has already completed.
    pub fn peek(&self, key: &CacheKey) -> Option<V> {
        self.entry(key).and_then(|entry| entry.peek().cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the keys currently present.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.lock().keys().copied().collect()
    }

    /// Drop every entry. Returns how many were removed.
    ///
    /// Futures already handed out keep running for their holders.
    pub fn clear_all(&self) -> usize {
        let removed = {
            let mut entries = self.lock();
            let n = entries.len();
            entries.clear();
            n
        };
        self.counters.clears.fetch_add(1, Ordering::Relaxed);
        debug!(removed, "Raster cache cleared");
        removed
    }

    /// Serve `transform(source)` for each key matching `pred`, where `source`
    /// is the future the producer originally installed for that key.
    ///
    /// Keys are snapshotted first. An entry is only replaced if it is still
    /// serving the handle that was snapshotted; entries removed or replaced in
    /// the meantime are skipped. Returns the number of entries replaced.
    pub fn rechain<P, T>(&self, pred: P, transform: T) -> usize
    where
        P: Fn(&CacheKey) -> bool,
        T: Fn(&CacheKey, SharedEntry<V>) -> BoxFuture<'static, V>,
    {
        let snapshot: Vec<(CacheKey, SharedEntry<V>, SharedEntry<V>)> = self
            .lock()
            .iter()
            .filter(|(key, _)| pred(key))
            .map(|(key, slot)| (*key, slot.source.clone(), slot.current.clone()))
            .collect();

        let mut replaced = 0;
        for (key, source, served) in snapshot {
            let next = transform(&key, source).shared();
            let mut entries = self.lock();
            match entries.get_mut(&key) {
                Some(slot) if Shared::ptr_eq(&slot.current, &served) => {
                    slot.current = next;
                    replaced += 1;
                }
                _ => debug!(key = %key, "Entry changed during rechain, skipped"),
            }
        }

        self.counters
            .rechained
            .fetch_add(replaced as u64, Ordering::Relaxed);
        replaced
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            rechained: self.counters.rechained.load(Ordering::Relaxed),
            clears: self.counters.clears.load(Ordering::Relaxed),
        }
    }
}
