//! ManualScheduler: a virtual clock driven by the test.

use crate::error::Fault;
use crate::schedule::{Scheduler, Task};
use crate::sync::lock;
use std::sync::Mutex;
use std::time::Duration;

struct Entry {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    seq: u64,
    queue: Vec<Entry>,
}

/// A [`Scheduler`] whose time only moves when the test calls
/// [`advance`](ManualScheduler::advance).
///
/// Tasks run on the calling thread, ordered by due time and then by
/// submission order. Tasks scheduled while advancing run in the same
/// call if they fall due before the target time.
#[derive(Default)]
pub struct ManualScheduler {
    clock: Mutex<Clock>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        lock(&self.clock).now
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        lock(&self.clock).queue.len()
    }

    /// Move time forward by `by`, running every task that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let task = {
                let mut clock = lock(&self.clock);
                let next = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(_, entry)| (entry.due, entry.seq))
                    .map(|(index, _)| index);
                match next {
                    Some(index) => {
                        let entry = clock.queue.swap_remove(index);
                        clock.now = entry.due;
                        entry.task
                    }
                    None => {
                        clock.now = target;
                        return;
                    }
                }
            };
            task();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<(), Fault> {
        let mut clock = lock(&self.clock);
        let due = clock.now + delay;
        let seq = clock.seq;
        clock.seq += 1;
        clock.queue.push(Entry { due, seq, task });
        Ok(())
    }
}
