//! Cache of word segmentations.
//!
//! Natural text repeats words constantly, so encoding a stream keeps the
//! segmentation of recently seen words instead of replaying the model on
//! each occurrence.

use ahash::AHashMap;
use compact_str::CompactString;
use std::collections::VecDeque;
use subword_core::Symbol;

/// Default number of cached words.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Bounded LRU cache from word token to subwords.
///
/// Recency is tracked lazily: every use pushes a fresh `(word, tick)`
/// entry onto the order queue, and eviction skips queue entries whose tick
/// is no longer the word's latest.
#[derive(Debug, Clone)]
pub struct EncodingCache {
    /// Word -> (subwords, tick of last use)
    entries: AHashMap<CompactString, (Vec<Symbol>, u64)>,
    /// Uses in order, possibly stale
    order: VecDeque<(CompactString, u64)>,
    /// Maximum number of entries; 0 disables caching
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl EncodingCache {
    /// Create a new encoding cache with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: AHashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY)),
            order: VecDeque::new(),
            capacity,
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Create a new encoding cache with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Get the cached segmentation of a word or compute it.
    pub fn get_or_encode<F>(&mut self, word: &str, encode: F) -> Vec<Symbol>
    where
        F: FnOnce(&str) -> Vec<Symbol>,
    {
        self.tick += 1;
        let tick = self.tick;

        if let Some((symbols, used)) = self.entries.get_mut(word) {
            *used = tick;
            let symbols = symbols.clone();
            self.hits += 1;
            self.order.push_back((CompactString::new(word), tick));
            self.compact();
            return symbols;
        }

        self.misses += 1;
        let symbols = encode(word);
        if self.capacity == 0 {
            return symbols;
        }

        while self.entries.len() >= self.capacity {
            if !self.evict_oldest() {
                break;
            }
        }
        self.entries
            .insert(CompactString::new(word), (symbols.clone(), tick));
        self.order.push_back((CompactString::new(word), tick));

        symbols
    }

    /// Check if a word is cached.
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resize the cache, evicting least recently used entries if needed.
    pub fn resize(&mut self, new_capacity: usize) {
        self.capacity = new_capacity;
        while self.entries.len() > new_capacity {
            if !self.evict_oldest() {
                break;
            }
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Remove the least recently used entry. Returns false if none is left.
    fn evict_oldest(&mut self) -> bool {
        while let Some((word, tick)) = self.order.pop_front() {
            let current = matches!(self.entries.get(&word), Some((_, used)) if *used == tick);
            if current {
                self.entries.remove(&word);
                return true;
            }
        }
        false
    }

    /// Drop stale order entries once they outnumber live ones.
    fn compact(&mut self) {
        if self.order.len() > 2 * self.entries.len() + 64 {
            let entries = &self.entries;
            self.order
                .retain(|(word, tick)| matches!(entries.get(word), Some((_, used)) if used == tick));
        }
    }
}

impl Default for EncodingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that had to encode
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, `None` before any lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(parts: &[&str]) -> Vec<Symbol> {
        parts.iter().map(|&p| Symbol::new(p)).collect()
    }

    #[test]
    fn test_cache_hit_miss() {
        let mut cache = EncodingCache::with_capacity(3);

        let first = cache.get_or_encode("LOW", |_| symbols(&["LOW", "_"]));
        assert_eq!(first, vec!["LOW", "_"]);

        let second = cache.get_or_encode("LOW", |_| panic!("should be cached"));
        assert_eq!(second, first);

        let third = cache.get_or_encode("NEW", |_| symbols(&["N", "E", "W", "_"]));
        assert_eq!(third.len(), 4);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 2));
        assert_eq!(stats.hit_rate(), Some(1.0 / 3.0));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = EncodingCache::with_capacity(2);

        cache.get_or_encode("A", |_| symbols(&["A_"]));
        cache.get_or_encode("B", |_| symbols(&["B_"]));
        cache.get_or_encode("C", |_| symbols(&["C_"]));

        assert!(!cache.contains("A"));
        assert!(cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_lru_update() {
        let mut cache = EncodingCache::with_capacity(2);

        cache.get_or_encode("A", |_| symbols(&["A_"]));
        cache.get_or_encode("B", |_| symbols(&["B_"]));

        // touch A so B becomes least recently used
        cache.get_or_encode("A", |_| symbols(&["A_"]));
        cache.get_or_encode("C", |_| symbols(&["C_"]));

        assert!(cache.contains("A"));
        assert!(!cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_many_hits_stay_bounded() {
        let mut cache = EncodingCache::with_capacity(2);
        for _ in 0..1000 {
            cache.get_or_encode("A", |_| symbols(&["A_"]));
        }
        assert_eq!(cache.len(), 1);
        assert!(cache.order.len() <= 2 * cache.len() + 65);
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let mut cache = EncodingCache::with_capacity(0);
        cache.get_or_encode("A", |_| symbols(&["A_"]));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = EncodingCache::new();
        cache.get_or_encode("LOW", |_| symbols(&["LOW_"]));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_resize() {
        let mut cache = EncodingCache::with_capacity(5);

        cache.get_or_encode("A", |_| symbols(&["A_"]));
        cache.get_or_encode("B", |_| symbols(&["B_"]));
        cache.get_or_encode("C", |_| symbols(&["C_"]));
        assert_eq!(cache.len(), 3);

        cache.resize(2);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("A"));
        assert!(cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_stats_before_use() {
        let stats = EncodingCache::with_capacity(100).stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.capacity, 100);
        assert_eq!(stats.hit_rate(), None);
    }
}
