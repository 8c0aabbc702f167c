//! Cache Item Module
//!
//! Defines a single stored value together with its optional absolute expiry.

use std::mem;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

// == Item ==
/// A stored value and the instant it stops being visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    /// The stored value
    pub value: T,
    /// Absolute expiration time, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl<T> Item<T> {
    // == Constructor ==
    /// Creates an item that never expires.
    pub fn new(value: T) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates an item that expires at the given instant.
    pub fn expiring_at(value: T, expires_at: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: Some(expires_at),
        }
    }

    /// Creates an item that expires `ttl` from now.
    ///
    /// A TTL too large to represent is treated as "never expires".
    pub fn expiring_in(value: T, ttl: std::time::Duration) -> Self {
        let expires_at = ChronoDuration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks whether the item has expired relative to `now`.
    ///
    /// An item is expired only when its expiry is strictly before `now`;
    /// an item without expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => expires < now,
            None => false,
        }
    }

    /// Checks whether the item has expired relative to the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Size Estimate ==
    /// Fixed per-type size estimate used for memory accounting.
    ///
    /// This is the inline footprint of the item, its value and its
    /// timestamp. Heap data owned by `T` is not counted.
    pub fn estimated_size() -> usize {
        mem::size_of::<Item<T>>()
            + mem::size_of::<T>()
            + mem::size_of::<Option<DateTime<Utc>>>()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_item_without_expiry_never_expires() {
        let item = Item::new("value");

        assert!(item.expires_at.is_none());
        assert!(!item.is_expired());
        assert!(!item.is_expired_at(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_item_expiring_in_future() {
        let item = Item::expiring_in("value", Duration::from_secs(60));

        assert!(item.expires_at.is_some());
        assert!(!item.is_expired());
    }

    #[test]
    fn test_item_expires_after_ttl() {
        let item = Item::expiring_in("value", Duration::from_millis(50));

        sleep(Duration::from_millis(100));

        assert!(item.is_expired());
    }

    #[test]
    fn test_expiration_boundary_is_strict() {
        let now = Utc::now();
        let item = Item::expiring_at("value", now);

        // Expiry equal to "now" is not yet in the past
        assert!(!item.is_expired_at(now));
        assert!(item.is_expired_at(now + ChronoDuration::milliseconds(1)));
    }

    #[test]
    fn test_huge_ttl_means_no_expiry() {
        let item = Item::expiring_in(1u8, Duration::MAX);
        assert!(item.expires_at.is_none());
    }

    #[test]
    fn test_estimated_size_is_per_type() {
        assert_eq!(Item::<u64>::estimated_size(), Item::<u64>::estimated_size());
        assert!(Item::<[u8; 64]>::estimated_size() > Item::<u8>::estimated_size());
    }
}
