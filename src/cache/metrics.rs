//! Cache Metrics Module
//!
//! Tracks hits, misses, item count and estimated memory usage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Metric Names ==
pub const HITS: &str = "hits";
pub const MISSES: &str = "misses";
pub const ITEMS: &str = "items";
pub const MEMORY_USAGE_BYTES: &str = "memoryUsageBytes";

// == Metrics Counters ==
/// Live counters owned by the store.
///
/// Hits and misses are atomics so lookups can record them while holding
/// only a shared lock. Item count and memory usage change only under the
/// exclusive lock.
#[derive(Debug, Default)]
pub(crate) struct MetricsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    items: usize,
    memory_usage_bytes: usize,
}

impl MetricsCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_items(&mut self, count: usize) {
        self.items = count;
    }

    pub(crate) fn add_memory(&mut self, bytes: usize) {
        self.memory_usage_bytes += bytes;
    }

    pub(crate) fn sub_memory(&mut self, bytes: usize) {
        self.memory_usage_bytes = self.memory_usage_bytes.saturating_sub(bytes);
    }

    /// Zeroes item count and memory usage. Hits and misses are kept.
    pub(crate) fn reset_usage(&mut self) {
        self.items = 0;
        self.memory_usage_bytes = 0;
    }

    pub(crate) fn snapshot(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            items: self.items as u64,
            memory_usage_bytes: self.memory_usage_bytes as u64,
        }
    }
}

// == Cache Metrics ==
/// Point-in-time copy of the cache metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetrics {
    /// Number of lookups that found a live entry
    pub hits: u64,
    /// Number of lookups that found nothing or an expired entry
    pub misses: u64,
    /// Current number of entries in the store
    pub items: u64,
    /// Estimated bytes held by the stored entries
    pub memory_usage_bytes: u64,
}

impl CacheMetrics {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == To Map ==
    /// Returns the metrics as a metric name to value mapping.
    pub fn to_map(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            (HITS, self.hits),
            (MISSES, self.misses),
            (ITEMS, self.items),
            (MEMORY_USAGE_BYTES, self.memory_usage_bytes),
        ])
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = MetricsCounters::default();
        assert_eq!(counters.snapshot(), CacheMetrics::default());
    }

    #[test]
    fn test_hits_and_misses() {
        let counters = MetricsCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();

        let metrics = counters.snapshot();
        assert_eq!(metrics.hits, 2);
        assert_eq!(metrics.misses, 1);
    }

    #[test]
    fn test_memory_accounting_never_underflows() {
        let mut counters = MetricsCounters::default();
        counters.add_memory(10);
        counters.sub_memory(25);
        assert_eq!(counters.snapshot().memory_usage_bytes, 0);
    }

    #[test]
    fn test_reset_usage_keeps_lookup_counters() {
        let mut counters = MetricsCounters::default();
        counters.record_hit();
        counters.set_items(3);
        counters.add_memory(96);

        counters.reset_usage();

        let metrics = counters.snapshot();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.items, 0);
        assert_eq!(metrics.memory_usage_bytes, 0);
    }

    #[test]
    fn test_hit_rate() {
        let mut metrics = CacheMetrics::default();
        assert_eq!(metrics.hit_rate(), 0.0);

        metrics.hits = 1;
        metrics.misses = 1;
        assert_eq!(metrics.hit_rate(), 0.5);
    }

    #[test]
    fn test_to_map_uses_metric_names() {
        let metrics = CacheMetrics {
            hits: 1,
            misses: 2,
            items: 3,
            memory_usage_bytes: 4,
        };

        let map = metrics.to_map();
        assert_eq!(map["hits"], 1);
        assert_eq!(map["misses"], 2);
        assert_eq!(map["items"], 3);
        assert_eq!(map["memoryUsageBytes"], 4);
    }

    #[test]
    fn test_serializes_with_camel_case_names() {
        let json = serde_json::to_value(CacheMetrics {
            memory_usage_bytes: 48,
            ..CacheMetrics::default()
        })
        .unwrap();

        assert_eq!(json["memoryUsageBytes"], 48);
        assert_eq!(json["hits"], 0);
    }
}
