//! Cache Handle Module
//!
//! The shared, cloneable cache handle. One lock guards the store, the
//! snapshot and the metrics for both callers and the maintenance loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::builder::CacheBuilder;
use crate::cache::{CacheMetrics, Item, Store};
use crate::error::{CacheError, Result};
use crate::middleware::{EqualityFn, Middlewares};

// == Settings ==
/// Configuration frozen by `CacheBuilder::build`.
pub(crate) struct Settings<T> {
    pub(crate) interval: Option<Duration>,
    pub(crate) equality: Option<EqualityFn<T>>,
    pub(crate) middlewares: Middlewares<T>,
}

struct Inner<T> {
    store: RwLock<Store<T>>,
    settings: Settings<T>,
    /// Broadcast cancellation flag, true once `stop` was called
    shutdown: watch::Sender<bool>,
    running: AtomicBool,
}

// == Cache ==
/// Thread-safe cache handle. Clones share the same state.
///
/// Store operations never fail: `get` reports absence or expiry with
/// `None`, and mutators are total.
pub struct Cache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("interval", &self.inner.settings.interval)
            .field("middlewares", &self.inner.settings.middlewares)
            .field("running", &self.is_running())
            .finish()
    }
}

impl<T> Cache<T> {
    // == Constructor ==
    /// Creates a cache without interval, predicate or callbacks.
    ///
    /// Usable as a plain store; `maintain` on it is a configuration error.
    pub fn new() -> Self {
        CacheBuilder::new().build()
    }

    /// Starts configuring a cache.
    pub fn builder() -> CacheBuilder<T> {
        CacheBuilder::new()
    }

    pub(crate) fn from_settings(settings: Settings<T>) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                store: RwLock::new(Store::new()),
                settings,
                shutdown,
                running: AtomicBool::new(false),
            }),
        }
    }

    // == Set ==
    /// Stores a value that never expires.
    pub fn set(&self, key: impl Into<String>, value: T) {
        self.write_store().set(key.into(), Item::new(value));
    }

    /// Stores a value that expires at the given instant.
    pub fn set_with_expiry(&self, key: impl Into<String>, value: T, expires_at: DateTime<Utc>) {
        self.write_store().set(key.into(), Item::expiring_at(value, expires_at));
    }

    /// Stores a value that expires `ttl` from now.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: T, ttl: Duration) {
        self.write_store().set(key.into(), Item::expiring_in(value, ttl));
    }

    // == Delete ==
    /// Removes an entry. Absent keys are ignored.
    pub fn delete(&self, key: &str) {
        self.write_store().delete(key);
    }

    /// Removes every entry.
    pub fn delete_all(&self) {
        self.write_store().delete_all();
    }

    // == Inspection ==
    /// Returns the number of stored entries, including expired ones the
    /// maintenance loop has not removed yet.
    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    /// Returns true if an entry is stored under `key`, expired or not.
    /// Does not count as a hit or a miss.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read_store().contains_key(key)
    }

    /// Returns a copy of the current metrics.
    pub fn metrics(&self) -> CacheMetrics {
        self.read_store().metrics()
    }

    // == Lifecycle ==
    /// Requests the maintenance loop to stop before its next tick.
    ///
    /// Never blocks and may be called any number of times, from any thread,
    /// before or after the loop started. Stopping is final for this cache.
    pub fn stop(&self) {
        let was_stopped = self.inner.shutdown.send_replace(true);
        if !was_stopped {
            debug!("Maintenance stop requested");
        }
    }

    /// Returns true while a maintenance loop is running.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Returns true once `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    // == Internals ==
    pub(crate) fn settings(&self) -> &Settings<T> {
        &self.inner.settings
    }

    pub(crate) fn read_store(&self) -> RwLockReadGuard<'_, Store<T>> {
        self.inner
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_store(&self) -> RwLockWriteGuard<'_, Store<T>> {
        self.inner
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    /// Marks the loop as running until the returned guard is dropped.
    pub(crate) fn mark_running(&self) -> Result<RunningGuard<'_>> {
        self.inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CacheError::AlreadyRunning)?;

        Ok(RunningGuard {
            flag: &self.inner.running,
        })
    }
}

impl<T: Clone> Cache<T> {
    // == Get ==
    /// Returns the value for `key`, or None if absent or expired.
    ///
    /// Expiry is checked against the current time, independently of the
    /// maintenance loop. Records a hit or a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        self.read_store().get(key, Utc::now())
    }

    // == Get All ==
    /// Returns every value that has not expired, in no particular order.
    pub fn get_all(&self) -> Vec<T> {
        self.read_store().get_all(Utc::now())
    }
}

impl<T> Cache<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Maintain ==
    /// Runs the maintenance loop until `stop` is called.
    ///
    /// Fails immediately if the tick interval is zero or unset, if no
    /// equality predicate was configured, or if another loop is already
    /// running for this cache. Meant to be spawned on its own task, see
    /// [`crate::tasks::spawn_maintenance`].
    pub async fn maintain(&self) -> Result<()> {
        crate::tasks::maintenance::run(self).await
    }
}

// == Running Guard ==
/// Clears the running flag when the loop exits, including on abort.
pub(crate) struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
