//! One-shot delayed tasks.
//!
//! Students use a [`Scheduler`] for the two timed steps of the workflow:
//! auto-submission after work starts, and grading after submission.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::{Result, RosterError};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay.
///
/// Implementations must never run the task inline: callers may hold locks
/// while scheduling.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// Cancels a scheduled task. Cancelling a task that already ran is a no-op.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn new(abort: AbortHandle) -> Self {
        Self { abort }
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Spawns each task onto a tokio runtime, sleeping for the delay first.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| RosterError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        debug!(delay_ms = delay.as_millis() as u64, "timer scheduled");
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        TimerHandle::new(join.abort_handle())
    }
}
