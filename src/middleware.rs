//! Middleware Module
//!
//! Ordered callback lists for every point of the tick cycle, and their
//! dispatch.
//!
//! Each invocation is isolated: a panicking callback is logged and the
//! remaining callbacks still run, so one faulty consumer cannot stop the
//! maintenance loop. The equality predicate is guarded the same way, see
//! `compare`.
//!
//! Callback lists are filled through [`crate::CacheBuilder`] only:
//!
//! ```compile_fail
//! let middlewares = tickcache::middleware::Middlewares::<i32>::new();
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::cache::{ChangeBatch, Item};

// == Callback Types ==
/// Callback run before or after every tick.
pub type TickMiddleware = Box<dyn Fn() + Send + Sync>;

/// Callback receiving one tick's batch of created, updated or deleted values.
pub type BatchMiddleware<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// Callback receiving a single expired entry.
///
/// Runs while the cache is exclusively locked; it must not call back into
/// the cache.
pub type ExpiryMiddleware<T> = Box<dyn Fn(&str, &Item<T>) + Send + Sync>;

/// Predicate deciding whether two values are semantically equal.
pub type EqualityFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

// == Event ==
/// Lifecycle point a callback is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    BeforeTick,
    AfterTick,
    Create,
    Update,
    Delete,
    Expiry,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::BeforeTick => "before_tick",
            Event::AfterTick => "after_tick",
            Event::Create => "create",
            Event::Update => "update",
            Event::Delete => "delete",
            Event::Expiry => "expiry",
        };
        f.write_str(name)
    }
}

// == Middlewares ==
/// Append-only callback lists, dispatched in registration order.
pub struct Middlewares<T> {
    before_tick: Vec<TickMiddleware>,
    after_tick: Vec<TickMiddleware>,
    create: Vec<BatchMiddleware<T>>,
    update: Vec<BatchMiddleware<T>>,
    delete: Vec<BatchMiddleware<T>>,
    expiry: Vec<ExpiryMiddleware<T>>,
}

impl<T> Default for Middlewares<T> {
    fn default() -> Self {
        Self {
            before_tick: Vec::new(),
            after_tick: Vec::new(),
            create: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
            expiry: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Middlewares<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middlewares")
            .field("before_tick", &self.before_tick.len())
            .field("after_tick", &self.after_tick.len())
            .field("create", &self.create.len())
            .field("update", &self.update.len())
            .field("delete", &self.delete.len())
            .field("expiry", &self.expiry.len())
            .finish()
    }
}

impl<T> Middlewares<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // == Registration ==
    pub(crate) fn push_before_tick(&mut self, m: TickMiddleware) {
        self.before_tick.push(m);
    }

    pub(crate) fn push_after_tick(&mut self, m: TickMiddleware) {
        self.after_tick.push(m);
    }

    pub(crate) fn push_create(&mut self, m: BatchMiddleware<T>) {
        self.create.push(m);
    }

    pub(crate) fn push_update(&mut self, m: BatchMiddleware<T>) {
        self.update.push(m);
    }

    pub(crate) fn push_delete(&mut self, m: BatchMiddleware<T>) {
        self.delete.push(m);
    }

    pub(crate) fn push_expiry(&mut self, m: ExpiryMiddleware<T>) {
        self.expiry.push(m);
    }

    /// Number of callbacks registered for `event`.
    #[cfg(test)]
    pub(crate) fn count(&self, event: Event) -> usize {
        match event {
            Event::BeforeTick => self.before_tick.len(),
            Event::AfterTick => self.after_tick.len(),
            Event::Create => self.create.len(),
            Event::Update => self.update.len(),
            Event::Delete => self.delete.len(),
            Event::Expiry => self.expiry.len(),
        }
    }

    // == Dispatch ==
    pub(crate) fn run_before_tick(&self) {
        for m in &self.before_tick {
            invoke(Event::BeforeTick, || m());
        }
    }

    pub(crate) fn run_after_tick(&self) {
        for m in &self.after_tick {
            invoke(Event::AfterTick, || m());
        }
    }

    pub(crate) fn run_expiry(&self, key: &str, item: &Item<T>) {
        for m in &self.expiry {
            invoke(Event::Expiry, || m(key, item));
        }
    }

    /// Hands each non-empty category of `batch` to its callbacks, once per
    /// callback.
    pub(crate) fn dispatch(&self, batch: &ChangeBatch<T>) {
        dispatch_batch(Event::Create, &self.create, &batch.created);
        dispatch_batch(Event::Update, &self.update, &batch.updated);
        dispatch_batch(Event::Delete, &self.delete, &batch.deleted);
    }
}

fn dispatch_batch<T>(event: Event, middlewares: &[BatchMiddleware<T>], values: &[T]) {
    if values.is_empty() {
        return;
    }

    for m in middlewares {
        invoke(event, || m(values));
    }
}

/// Applies the equality predicate to a live value and its snapshot value.
///
/// A panicking predicate is logged and counts as "not equal", so the entry
/// is reported as updated and the tick carries on.
pub(crate) fn compare<T, F>(equals: F, current: &T, previous: &T) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    match panic::catch_unwind(AssertUnwindSafe(|| equals(current, previous))) {
        Ok(equal) => equal,
        Err(payload) => {
            error!("equality predicate panicked: {}", panic_message(&*payload));
            false
        }
    }
}

fn invoke<F: FnOnce()>(event: Event, f: F) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        error!(event = %event, "middleware panicked: {}", panic_message(&*payload));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}
