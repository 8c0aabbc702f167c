//! Cache Module
//!
//! Provides the lock-guarded store, its previous-tick snapshot and metrics.
//!
//! The store itself stays crate-private; callers only reach it through
//! [`Cache`], which holds the lock for every operation:
//!
//! ```compile_fail
//! let store: tickcache::cache::Store<i32> = tickcache::cache::Store::new();
//! ```

mod batch;
mod handle;
mod item;
mod metrics;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use batch::ChangeBatch;
pub use handle::Cache;
pub(crate) use handle::Settings;
pub use item::Item;
pub use metrics::{CacheMetrics, HITS, ITEMS, MEMORY_USAGE_BYTES, MISSES};
pub(crate) use store::Store;
