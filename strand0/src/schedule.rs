//! The timer capability consumed by `fork` admission control.

use crate::error::Fault;
use std::time::Duration;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay.
///
/// The engine uses this for two things only: re-evaluating a fork's
/// gating predicate every beat, and the one-beat settling delay before a
/// fork declares completion.
pub trait Scheduler: Send + Sync {
    /// Run `task` once, no earlier than `delay` from now.
    ///
    /// Returns [`Fault::Scheduler`] if no timer is available; the task is
    /// dropped in that case.
    fn schedule(&self, delay: Duration, task: Task) -> Result<(), Fault>;
}
