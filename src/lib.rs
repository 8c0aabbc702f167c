//! Tickcache - an in-process cache with coalesced change notification
//!
//! Stores key/value pairs with optional absolute expiry. A periodic
//! maintenance loop expires stale entries, diffs the store against the
//! previous tick and reports created, updated, deleted and expired values
//! to registered callbacks.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod tasks;

pub use builder::CacheBuilder;
pub use cache::{Cache, CacheMetrics, ChangeBatch, Item};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_maintenance;
