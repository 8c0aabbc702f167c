//! Cache Builder Module
//!
//! Collects the equality predicate, tick interval and callbacks before the
//! cache is built. A built `Cache` has no registration methods, so nothing
//! can be registered once maintenance may be running.

use std::time::Duration;

use crate::cache::{Cache, Item, Settings};
use crate::config::Config;
use crate::middleware::{EqualityFn, Middlewares};

// == Cache Builder ==
/// Pre-start configuration for a [`Cache`].
///
/// # Example
/// ```ignore
/// let cache = Cache::<u32>::builder()
///     .with_interval(Duration::from_millis(500))
///     .with_partial_eq()
///     .on_create(|values| println!("created: {:?}", values))
///     .build();
/// ```
pub struct CacheBuilder<T> {
    interval: Option<Duration>,
    equality: Option<EqualityFn<T>>,
    middlewares: Middlewares<T>,
}

impl<T> Default for CacheBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheBuilder<T> {
    // == Constructor ==
    /// Creates a builder with no interval, no predicate and no callbacks.
    pub fn new() -> Self {
        Self {
            interval: None,
            equality: None,
            middlewares: Middlewares::new(),
        }
    }

    /// Creates a builder seeded with the configured tick interval.
    pub fn from_config(config: &Config) -> Self {
        Self::new().with_interval(config.tick_interval())
    }

    // == Settings ==
    /// Sets the maintenance tick interval.
    ///
    /// A zero interval is accepted here and rejected by `maintain`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the predicate used to tell updated values from unchanged ones.
    pub fn equals<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.equality = Some(Box::new(f));
        self
    }

    // == Callbacks ==
    /// Registers a callback run at the start of every tick.
    pub fn on_before_tick<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.middlewares.push_before_tick(Box::new(f));
        self
    }

    /// Registers a callback run at the end of every tick.
    pub fn on_after_tick<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.middlewares.push_after_tick(Box::new(f));
        self
    }

    /// Registers a callback for the values created since the last tick.
    pub fn on_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.middlewares.push_create(Box::new(f));
        self
    }

    /// Registers a callback for the values updated since the last tick.
    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.middlewares.push_update(Box::new(f));
        self
    }

    /// Registers a callback for the values deleted or expired since the last tick.
    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.middlewares.push_delete(Box::new(f));
        self
    }

    /// Registers a callback invoked once per expired entry.
    ///
    /// The callback runs while the cache is exclusively locked. Calling back
    /// into the cache from it deadlocks.
    pub fn on_expiry<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Item<T>) + Send + Sync + 'static,
    {
        self.middlewares.push_expiry(Box::new(f));
        self
    }

    // == Build ==
    /// Freezes the configuration into a cache handle.
    pub fn build(self) -> Cache<T> {
        Cache::from_settings(Settings {
            interval: self.interval,
            equality: self.equality,
            middlewares: self.middlewares,
        })
    }
}

impl<T: PartialEq> CacheBuilder<T> {
    /// Uses `PartialEq` as the equality predicate.
    pub fn with_partial_eq(self) -> Self
    where
        T: 'static,
    {
        self.equals(|a: &T, b: &T| a == b)
    }
}
