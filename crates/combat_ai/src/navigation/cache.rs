//! Level-scoped path cache keyed by quantized destination.
//!
//! One agent's correction (partial/invalid path → substitute destination) is
//! reused by every agent heading for the same grid cell until it expires.
//! Expired entries are never trusted; removing them is opportunistic
//! (`CacheEviction` scans a few keys per tick).

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::PathStatus;

/// Round every coordinate to the nearest multiple of `grid_size`.
///
/// Idempotent: `quantize(quantize(p, g), g) == quantize(p, g)`.
pub fn quantize(position: Vec3, grid_size: f32) -> Vec3 {
    (position / grid_size).round() * grid_size
}

/// Integer cell index of a quantized position (hashable cache key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey(pub IVec3);

impl GridKey {
    pub fn from_position(position: Vec3, grid_size: f32) -> Self {
        Self((position / grid_size).round().as_ivec3())
    }

    /// World position of the cell center.
    pub fn to_position(self, grid_size: f32) -> Vec3 {
        self.0.as_vec3() * grid_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCacheEntry {
    /// Destination to hand to the movement backend instead of the requested one
    pub destination: Vec3,
    /// Time of the write (seconds, fixed clock)
    pub timestamp: f32,
    /// Status of the path query that produced the entry
    pub status: PathStatus,
}

/// Resource: shared path cache (created on level load, dropped with the world).
#[derive(Resource, Debug)]
pub struct PathCache {
    entries: HashMap<GridKey, PathCacheEntry>,
    lifetime: f32,
    grid_size: f32,
}

impl PathCache {
    pub fn new(lifetime: f32, grid_size: f32) -> Self {
        Self {
            entries: HashMap::new(),
            lifetime,
            grid_size,
        }
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    pub fn key_for(&self, position: Vec3) -> GridKey {
        GridKey::from_position(position, self.grid_size)
    }

    /// Entry for `key` if it is younger than the lifetime.
    pub fn fresh(&self, key: GridKey, now: f32) -> Option<&PathCacheEntry> {
        self.entries
            .get(&key)
            .filter(|entry| now - entry.timestamp < self.lifetime)
    }

    pub fn get(&self, key: GridKey) -> Option<&PathCacheEntry> {
        self.entries.get(&key)
    }

    pub fn insert(&mut self, key: GridKey, entry: PathCacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn is_stale(&self, entry: &PathCacheEntry, now: f32) -> bool {
        now - entry.timestamp > self.lifetime
    }

    /// Remove `key` only if its entry is (still) stale.
    pub fn remove_if_stale(&mut self, key: GridKey, now: f32) -> bool {
        let stale = self
            .entries
            .get(&key)
            .is_some_and(|entry| self.is_stale(entry, now));

        if stale {
            self.entries.remove(&key);
        }
        stale
    }

    pub fn keys(&self) -> Vec<GridKey> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Resource: incremental stale-entry scan over the path cache.
///
/// Started by a cache write (low probability), then advanced a batch of keys
/// per tick so a large cache never costs a whole tick.
#[derive(Resource, Debug, Default)]
pub struct CacheEviction {
    scan: Option<EvictionScan>,
}

#[derive(Debug)]
struct EvictionScan {
    pending: Vec<GridKey>,
    cursor: usize,
    stale: Vec<GridKey>,
}

impl CacheEviction {
    pub fn is_running(&self) -> bool {
        self.scan.is_some()
    }

    /// Snapshot the current keys and start a scan (no-op while one is running).
    pub fn start(&mut self, cache: &PathCache) -> bool {
        if self.scan.is_some() {
            return false;
        }

        self.scan = Some(EvictionScan {
            pending: cache.keys(),
            cursor: 0,
            stale: Vec::new(),
        });
        true
    }

    /// Inspect up to `batch` keys. Returns `Some(removed)` when the scan finished this step.
    pub fn step(&mut self, cache: &mut PathCache, now: f32, batch: usize) -> Option<usize> {
        let scan = self.scan.as_mut()?;

        let end = (scan.cursor + batch.max(1)).min(scan.pending.len());
        for key in &scan.pending[scan.cursor..end] {
            // Key may already be gone (cleared)
            if let Some(entry) = cache.get(*key) {
                if cache.is_stale(entry, now) {
                    scan.stale.push(*key);
                }
            }
        }
        scan.cursor = end;

        if scan.cursor < scan.pending.len() {
            return None;
        }

        let removed = scan
            .stale
            .iter()
            .filter(|key| cache.remove_if_stale(**key, now))
            .count();
        self.scan = None;
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: f32) -> PathCacheEntry {
        PathCacheEntry {
            destination: Vec3::new(1.0, 0.0, 1.0),
            timestamp,
            status: PathStatus::Partial,
        }
    }

    #[test]
    fn test_quantize_rounds_to_grid() {
        assert_eq!(quantize(Vec3::new(2.9, 0.4, -3.1), 2.0), Vec3::new(2.0, 0.0, -4.0));
        assert_eq!(quantize(Vec3::new(3.1, 1.2, 0.9), 2.0), Vec3::new(4.0, 2.0, 0.0));
    }

    #[test]
    fn test_quantize_idempotent() {
        let samples = [
            Vec3::new(0.3, 7.7, -12.9),
            Vec3::new(123.456, -0.001, 99.99),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1e4 + 0.7, 3.0, -5.5),
        ];

        for grid in [0.5, 1.0, 2.0, 3.0] {
            for p in samples {
                let once = quantize(p, grid);
                assert_eq!(quantize(once, grid), once, "grid {} point {:?}", grid, p);
                assert_eq!(GridKey::from_position(once, grid), GridKey::from_position(p, grid));
            }
        }
    }

    #[test]
    fn test_nearby_destinations_share_a_key() {
        let cache = PathCache::new(3.0, 2.0);
        assert_eq!(cache.key_for(Vec3::new(10.2, 0.0, 4.4)), cache.key_for(Vec3::new(9.6, 0.3, 3.8)));
        assert_ne!(cache.key_for(Vec3::new(10.2, 0.0, 4.4)), cache.key_for(Vec3::new(12.2, 0.0, 4.4)));
    }

    #[test]
    fn test_fresh_respects_lifetime() {
        let mut cache = PathCache::new(3.0, 2.0);
        let key = cache.key_for(Vec3::new(4.0, 0.0, 4.0));
        cache.insert(key, entry(10.0));

        let eps = 0.01;
        assert!(cache.fresh(key, 10.0 + 3.0 - eps).is_some());
        assert!(cache.fresh(key, 10.0 + 3.0 + eps).is_none());
        // Stale but not yet evicted
        assert!(cache.get(key).is_some());
    }

    #[test]
    fn test_remove_if_stale() {
        let mut cache = PathCache::new(3.0, 2.0);
        let key = cache.key_for(Vec3::ZERO);
        cache.insert(key, entry(0.0));

        assert!(!cache.remove_if_stale(key, 2.0));
        assert!(cache.remove_if_stale(key, 3.5));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_scan_is_batched() {
        let mut cache = PathCache::new(3.0, 1.0);
        for i in 0..25 {
            let key = GridKey(IVec3::new(i, 0, 0));
            // Even keys stale at t=10, odd keys fresh
            let timestamp = if i % 2 == 0 { 0.0 } else { 9.0 };
            cache.insert(key, entry(timestamp));
        }

        let mut eviction = CacheEviction::default();
        assert!(eviction.start(&cache));
        assert!(!eviction.start(&cache)); // already running

        assert_eq!(eviction.step(&mut cache, 10.0, 10), None);
        assert_eq!(eviction.step(&mut cache, 10.0, 10), None);
        // Nothing removed until the scan completes
        assert_eq!(cache.len(), 25);

        assert_eq!(eviction.step(&mut cache, 10.0, 10), Some(13));
        assert_eq!(cache.len(), 12);
        assert!(!eviction.is_running());
    }

    #[test]
    fn test_eviction_keeps_rewritten_entry() {
        let mut cache = PathCache::new(3.0, 1.0);
        let key = GridKey(IVec3::ZERO);
        cache.insert(key, entry(0.0));

        let mut eviction = CacheEviction::default();
        eviction.start(&cache);
        // Single key → scan inspects and finishes in one step; rewrite before it runs
        cache.insert(key, entry(9.5));
        assert_eq!(eviction.step(&mut cache, 10.0, 10), Some(0));
        assert!(cache.get(key).is_some());
    }

    #[test]
    fn test_eviction_step_without_scan() {
        let mut cache = PathCache::new(3.0, 1.0);
        let mut eviction = CacheEviction::default();
        assert_eq!(eviction.step(&mut cache, 1.0, 10), None);
    }
}
