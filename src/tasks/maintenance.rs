//! Maintenance Task
//!
//! Periodic loop that expires stale entries, diffs the store against the
//! previous tick's snapshot and hands the resulting batches to the
//! registered callbacks.

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{Cache, ChangeBatch};
use crate::error::{CacheError, Result};
use crate::middleware;

// == Tick Summary ==
/// Counts produced by one tick, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub expired: usize,
}

/// Spawns the maintenance loop of `cache` on the tokio runtime.
///
/// The loop runs until `Cache::stop` is called on any clone of the cache.
/// The handle resolves to the loop's result, which is an error only when
/// the cache was misconfigured or already maintained elsewhere.
///
/// # Example
/// ```ignore
/// let handle = spawn_maintenance(cache.clone());
/// // Later, during shutdown:
/// cache.stop();
/// handle.await??;
/// ```
pub fn spawn_maintenance<T>(cache: Cache<T>) -> JoinHandle<Result<()>>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move { cache.maintain().await })
}

/// Runs the loop until cancellation.
///
/// Configuration is validated before anything else. Cancellation is checked
/// before every tick; when it and a due tick are ready together the loop
/// stops without ticking.
pub(crate) async fn run<T>(cache: &Cache<T>) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
{
    let settings = cache.settings();

    let interval = match settings.interval {
        Some(interval) if !interval.is_zero() => interval,
        other => return Err(CacheError::InvalidInterval(other.unwrap_or_default())),
    };
    let equals = settings
        .equality
        .as_ref()
        .ok_or(CacheError::MissingEquality)?;

    let _running = cache.mark_running()?;
    let mut shutdown = cache.shutdown_receiver();

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the first real tick is one interval out
    ticker.tick().await;

    info!("Starting maintenance loop with interval of {:?}", interval);

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let summary = run_tick(cache, equals);

        debug!(
            created = summary.created,
            updated = summary.updated,
            deleted = summary.deleted,
            expired = summary.expired,
            "Maintenance tick complete"
        );
    }

    info!("Maintenance loop stopped");
    Ok(())
}

/// Executes one tick.
///
/// Before-tick callbacks, then under the exclusive lock: expire pass (with
/// expiry callbacks), created/updated pass, deleted pass and snapshot
/// replacement. After the lock is released the non-empty batches are
/// dispatched, followed by the after-tick callbacks.
///
/// A panicking equality predicate marks the entry as updated; it never
/// unwinds through the held lock.
pub(crate) fn run_tick<T, F>(cache: &Cache<T>, equals: F) -> TickSummary
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let middlewares = &cache.settings().middlewares;

    middlewares.run_before_tick();

    let mut batch = ChangeBatch::new();
    let expired = {
        let mut store = cache.write_store();

        let expired = store.expire(Utc::now(), &mut batch, |key, item| {
            middlewares.run_expiry(key, item)
        });
        store.diff(
            |current, previous| middleware::compare(&equals, current, previous),
            &expired,
            &mut batch,
        );
        store.replace_snapshot();

        expired.len()
    };

    let summary = TickSummary {
        created: batch.created.len(),
        updated: batch.updated.len(),
        deleted: batch.deleted.len(),
        expired,
    };

    middlewares.dispatch(&batch);
    batch.clear();

    middlewares.run_after_tick();

    summary
}
