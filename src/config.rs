//! Configuration Module
//!
//! Loads runtime settings for the maintenance loop from environment variables.

use std::env;
use std::time::Duration;

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Cache runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maintenance tick interval in milliseconds
    pub tick_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TICK_INTERVAL_MS` - Maintenance tick interval in milliseconds (default: 1000)
    ///
    /// A value of `0` is kept as is and rejected when maintenance starts.
    pub fn from_env() -> Self {
        Self {
            tick_interval_ms: env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TICK_INTERVAL_MS),
        }
    }

    /// Returns the tick interval as a Duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}
