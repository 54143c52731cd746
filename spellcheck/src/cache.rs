//! Two LRU caches sitting in front of the dictionary: checks (keyed by
//! lowercase word) and suggestions (keyed by `lower:limit`).

use std::num::NonZeroUsize;

use lru::LruCache;

const CHECK_CAPACITY: usize = 10_000;
const SUGGESTION_CAPACITY: usize = 1_000;

/// Hit/miss counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups served from the cache.
    pub hits: u64,
    /// Number of lookups that required recomputation.
    pub misses: u64,
}

#[derive(Debug)]
pub(crate) struct CheckCache {
    entries: LruCache<String, bool>,
    pub(crate) stats: CacheStats,
}

impl CheckCache {
    fn new() -> Self {
        CheckCache {
            entries: LruCache::new(NonZeroUsize::new(CHECK_CAPACITY).expect("capacity is non-zero")),
            stats: CacheStats::default(),
        }
    }

    pub(crate) fn get_or_compute(&mut self, key: &str, compute: impl FnOnce() -> bool) -> bool {
        if let Some(&hit) = self.entries.get(key) {
            self.stats.hits += 1;
            return hit;
        }
        self.stats.misses += 1;
        let value = compute();
        self.entries.put(key.to_string(), value);
        value
    }

    pub(crate) fn invalidate(&mut self, key: &str) {
        self.entries.pop(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

impl Default for CheckCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub(crate) struct SuggestionCache {
    entries: LruCache<String, Vec<String>>,
    pub(crate) stats: CacheStats,
}

impl SuggestionCache {
    fn new() -> Self {
        SuggestionCache {
            entries: LruCache::new(NonZeroUsize::new(SUGGESTION_CAPACITY).expect("capacity is non-zero")),
            stats: CacheStats::default(),
        }
    }

    pub(crate) fn get_or_compute(&mut self, key: &str, compute: impl FnOnce() -> Vec<String>) -> Vec<String> {
        if let Some(hit) = self.entries.get(key) {
            self.stats.hits += 1;
            return hit.clone();
        }
        self.stats.misses += 1;
        let value = compute();
        self.entries.put(key.to_string(), value.clone());
        value
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new()
    }
}
