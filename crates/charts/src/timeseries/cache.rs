use super::{SeriesDataset, parse_timestamp_ms};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Timestamp memo entries kept per dataset entry.
const TIMESTAMPS_PER_DATASET: usize = 16;

/// A map that forgets its oldest entry once full.
struct Bounded<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> Bounded<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    /// Inserts a value, returning how many entries were evicted to make room.
    fn insert(&mut self, key: K, value: V) -> usize {
        if self.map.insert(key.clone(), value).is_some() {
            return 0;
        }

        self.order.push_back(key);

        let mut evicted = 0;
        while self.map.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.map.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }

        evicted
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

struct Inner {
    datasets: Bounded<String, SeriesDataset>,
    timestamps: Bounded<String, i64>,
}

/// Snapshot of the cache counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub datasets: usize,
    pub timestamps: usize,
}

/// Memoizes built time-series datasets and parsed timestamps.
///
/// Both maps are bounded and evict in insertion order. The cache only ever
/// short-circuits work: a hit returns exactly what a fresh build would.
pub struct SeriesCache {
    inner: Mutex<Inner>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl SeriesCache {
    /// Creates a cache holding at most `capacity` datasets (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            inner: Mutex::new(Inner {
                datasets: Bounded::new(capacity),
                timestamps: Bounded::new(capacity.saturating_mul(TIMESTAMPS_PER_DATASET)),
            }),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &str) -> Option<SeriesDataset> {
        let dataset = self.inner.lock().datasets.get(&key.to_string());

        if dataset.is_some() {
            trace!("series cache hit: {key}");
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        dataset
    }

    pub fn insert(&self, key: String, dataset: SeriesDataset) {
        let evicted = self.inner.lock().datasets.insert(key, dataset);

        if evicted > 0 {
            debug!("series cache full, evicted {evicted} dataset(s)");
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
    }

    /// Parsed form of a timestamp, memoized.
    pub fn timestamp_ms(&self, timestamp: &str) -> i64 {
        let key = timestamp.to_string();

        if let Some(ms) = self.inner.lock().timestamps.get(&key) {
            return ms;
        }

        let ms = parse_timestamp_ms(timestamp);
        self.inner.lock().timestamps.insert(key, ms);
        ms
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            datasets: inner.datasets.len(),
            timestamps: inner.timestamps.len(),
        }
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(label: &str) -> SeriesDataset {
        SeriesDataset {
            label: label.to_string(),
            data: Vec::new(),
            color: String::new(),
            axis_id: "y".to_string(),
            border_dash: None,
            segment_widths: Vec::new(),
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let cache = SeriesCache::new(2);

        cache.insert("a".to_string(), dataset("a"));
        cache.insert("b".to_string(), dataset("b"));
        cache.insert("c".to_string(), dataset("c"));

        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").map(|d| d.label), Some("b".to_string()));
        assert_eq!(cache.get("c").map(|d| d.label), Some("c".to_string()));

        let stats = cache.stats();
        assert_eq!(stats.datasets, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn reinsert_does_not_evict() {
        let cache = SeriesCache::new(2);

        cache.insert("a".to_string(), dataset("a"));
        cache.insert("b".to_string(), dataset("b"));
        cache.insert("a".to_string(), dataset("a2"));

        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get("a").map(|d| d.label), Some("a2".to_string()));
    }

    #[test]
    fn zero_capacity_holds_one() {
        let cache = SeriesCache::new(0);
        assert_eq!(cache.capacity(), 1);

        cache.insert("a".to_string(), dataset("a"));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn memoizes_timestamps() {
        let cache = SeriesCache::new(1);

        assert_eq!(cache.timestamp_ms("1970-01-01T00:00:02Z"), 2000);
        assert_eq!(cache.timestamp_ms("1970-01-01T00:00:02Z"), 2000);
        assert_eq!(cache.stats().timestamps, 1);

        for i in 0..(2 * TIMESTAMPS_PER_DATASET) {
            cache.timestamp_ms(&format!("1970-01-01T00:00:{:02}Z", i % 60));
        }
        assert_eq!(cache.stats().timestamps, TIMESTAMPS_PER_DATASET);
    }
}
