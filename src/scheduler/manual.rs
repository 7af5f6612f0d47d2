//! # Manual Tick Scheduler
//!
//! Deterministic [`TickScheduler`] for tests and hosts that drive time
//! themselves. Registrations are recorded rather than spawned; each call to
//! [`ManualTickScheduler::tick`] fires every active registration exactly
//! once on the caller's thread, so execution mode and initial delay are
//! irrelevant here and ignored.

use parking_lot::Mutex;
use tracing::error;

use crate::error::{DispatchError, Result};

use super::{ExecutionMode, TaskHandle, TickCallback, TickScheduler};

/// A recorded registration, exposed so callers can drive or inspect it
/// directly. [`ScheduledTick::fire`] invokes the raw callback without any
/// cancellation check, which is exactly what a test simulating in-flight or
/// contract-violating concurrent delivery needs.
#[derive(Clone)]
pub struct ScheduledTick {
    callback: TickCallback,
    handle: TaskHandle,
}

impl ScheduledTick {
    /// Invoke the callback once, regardless of cancellation state.
    pub fn fire(&self) -> Result<()> {
        (self.callback)()
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }
}

/// Tick scheduler driven explicitly by the caller.
#[derive(Default)]
pub struct ManualTickScheduler {
    tasks: Mutex<Vec<ScheduledTick>>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations that have not been cancelled.
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|task| !task.handle.is_cancelled())
            .count()
    }

    /// Snapshot of every still-recorded registration.
    pub fn registrations(&self) -> Vec<ScheduledTick> {
        self.tasks.lock().clone()
    }

    /// Fire every active registration once, in registration order, on the
    /// calling thread. Returns the number of callbacks invoked.
    ///
    /// Mirrors the tokio driver's failure policy: a callback error is logged
    /// and cancels that registration. Cancelled registrations are dropped.
    pub fn tick(&self) -> usize {
        let snapshot: Vec<ScheduledTick> = self
            .tasks
            .lock()
            .iter()
            .filter(|task| !task.handle.is_cancelled())
            .cloned()
            .collect();

        let mut fired = 0;
        for task in &snapshot {
            if task.handle.is_cancelled() {
                continue;
            }
            fired += 1;
            if let Err(e) = task.fire() {
                error!(error = %e, "repeating task failed, cancelling registration");
                task.handle.cancel();
            }
        }

        self.tasks
            .lock()
            .retain(|task| !task.handle.is_cancelled());
        fired
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule_repeating(
        &self,
        _mode: ExecutionMode,
        callback: TickCallback,
        _initial_delay_ticks: u32,
        period_ticks: u32,
    ) -> Result<TaskHandle> {
        if period_ticks == 0 {
            return Err(DispatchError::InvalidArgument(
                "period must be at least one tick".to_string(),
            ));
        }

        let handle = TaskHandle::new();
        self.tasks.lock().push(ScheduledTick {
            callback,
            handle: handle.clone(),
        });
        Ok(handle)
    }
}
