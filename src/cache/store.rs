//! Cache Store Module
//!
//! Unlocked container for the live entries, the previous tick's snapshot
//! and the metrics. `Cache` wraps it in a single lock.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::cache::metrics::MetricsCounters;
use crate::cache::{CacheMetrics, ChangeBatch, Item};

// == Cache Store ==
/// Live entries, diff baseline and counters.
#[derive(Debug)]
pub struct Store<T> {
    /// Authoritative current state
    entries: HashMap<String, Item<T>>,
    /// Owned copy of `entries` as of the end of the last tick
    snapshot: HashMap<String, Item<T>>,
    /// Hit/miss/item/memory counters
    metrics: MetricsCounters,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Store<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            snapshot: HashMap::new(),
            metrics: MetricsCounters::default(),
        }
    }

    // == Set ==
    /// Inserts or overwrites an entry.
    ///
    /// The size of a replaced entry is subtracted before the new one is added.
    pub fn set(&mut self, key: String, item: Item<T>) {
        if self.entries.insert(key, item).is_some() {
            self.metrics.sub_memory(Item::<T>::estimated_size());
        }
        self.metrics.add_memory(Item::<T>::estimated_size());
        self.metrics.set_items(self.entries.len());
    }

    // == Delete ==
    /// Removes an entry. Absent keys are ignored.
    pub fn delete(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.account_removed();
        }
    }

    // == Delete All ==
    /// Removes every entry and zeroes item count and memory usage.
    pub fn delete_all(&mut self) {
        self.entries.clear();
        self.metrics.reset_usage();
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Metrics ==
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.snapshot()
    }

    fn account_removed(&mut self) {
        self.metrics.sub_memory(Item::<T>::estimated_size());
        self.metrics.set_items(self.entries.len());
    }
}

impl<T: Clone> Store<T> {
    // == Get ==
    /// Returns the value for `key` if present and not expired at `now`.
    ///
    /// Records a hit or a miss. Needs only shared access.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        match self.entries.get(key) {
            Some(item) if !item.is_expired_at(now) => {
                self.metrics.record_hit();
                Some(item.value.clone())
            }
            _ => {
                self.metrics.record_miss();
                None
            }
        }
    }

    // == Get All ==
    /// Returns every value not expired at `now`, in no particular order.
    pub fn get_all(&self, now: DateTime<Utc>) -> Vec<T> {
        self.entries
            .values()
            .filter(|item| !item.is_expired_at(now))
            .map(|item| item.value.clone())
            .collect()
    }

    // == Expire ==
    /// Removes every entry expired at `now`.
    ///
    /// Each removed value is appended to `batch.deleted` and handed to
    /// `on_expired` together with its key. Returns the removed keys so the
    /// deleted pass does not report them a second time.
    pub fn expire<F>(
        &mut self,
        now: DateTime<Utc>,
        batch: &mut ChangeBatch<T>,
        mut on_expired: F,
    ) -> HashSet<String>
    where
        F: FnMut(&str, &Item<T>),
    {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, item)| item.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut processed = HashSet::with_capacity(expired_keys.len());

        for key in expired_keys {
            if let Some(item) = self.entries.remove(&key) {
                batch.deleted.push(item.value.clone());
                on_expired(&key, &item);
                self.account_removed();
                processed.insert(key);
            }
        }

        processed
    }

    // == Diff ==
    /// Compares the live entries against the snapshot.
    ///
    /// Keys missing from the snapshot are created, keys whose values differ
    /// under `equals` are updated, and snapshot keys missing from the live
    /// entries are deleted unless listed in `already_deleted`.
    pub fn diff<F>(
        &self,
        equals: F,
        already_deleted: &HashSet<String>,
        batch: &mut ChangeBatch<T>,
    ) where
        F: Fn(&T, &T) -> bool,
    {
        for (key, item) in &self.entries {
            match self.snapshot.get(key) {
                None => batch.created.push(item.value.clone()),
                Some(previous) if !equals(&item.value, &previous.value) => {
                    batch.updated.push(item.value.clone())
                }
                Some(_) => {}
            }
        }

        for (key, previous) in &self.snapshot {
            if !self.entries.contains_key(key) && !already_deleted.contains(key) {
                batch.deleted.push(previous.value.clone());
            }
        }
    }

    // == Replace Snapshot ==
    /// Replaces the snapshot with a full copy of the live entries.
    pub fn replace_snapshot(&mut self) {
        self.snapshot = self.entries.clone();
    }
}
