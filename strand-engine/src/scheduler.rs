//! Timer capability backed by tokio.

use std::time::Duration;
use strand0::{Fault, Scheduler, Task};
use tokio::runtime::Handle;

/// A [`Scheduler`] that spawns a sleeping task on a tokio runtime.
///
/// Without an explicit handle it uses the runtime of the calling thread,
/// and scheduling outside any runtime fails with [`Fault::Scheduler`].
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Schedule on the ambient runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule on a specific runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<(), Fault> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|e| Fault::Scheduler(e.to_string()))?,
        };
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_a_runtime_is_a_fault() {
        let err = TokioScheduler::new()
            .schedule(Duration::from_millis(1), Box::new(|| {}))
            .unwrap_err();
        assert!(matches!(err, Fault::Scheduler(_)));
    }
}
