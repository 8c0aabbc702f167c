//! Error types for the cache
//!
//! Store operations are total; only starting maintenance can fail.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Tick interval is zero or was never configured
    #[error("Invalid tick interval: {0:?} (must be greater than zero)")]
    InvalidInterval(Duration),

    /// No equality predicate was configured
    #[error("Missing equality predicate: configure one before starting maintenance")]
    MissingEquality,

    /// Maintenance is already running for this cache
    #[error("Maintenance loop is already running")]
    AlreadyRunning,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
