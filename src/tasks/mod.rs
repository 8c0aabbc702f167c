//! Background Tasks Module
//!
//! Contains the periodic maintenance loop that drives change notification.
//!
//! # Tasks
//! - Maintenance: expires entries, diffs against the last snapshot and
//!   dispatches the batches at the configured interval

pub(crate) mod maintenance;

pub use maintenance::spawn_maintenance;
