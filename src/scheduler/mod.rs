//! # Tick Scheduling
//!
//! The scheduler collaborator contract consumed by the batch dispatcher: a
//! recurring callback registered with a fixed period, returning a handle
//! that can be cancelled idempotently from any thread.
//!
//! Two implementations ship with the crate:
//!
//! - [`tokio_impl::TokioTickScheduler`] — production driver backed by tokio
//!   timers, owning an isolated worker-pool context and a single shared
//!   cooperative context.
//! - [`manual::ManualTickScheduler`] — deterministic driver for tests and
//!   hosts that advance time themselves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::error::Result;

pub mod manual;
pub mod tokio_impl;

/// Which scheduler context a registration runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Isolated worker pool: ticks run on arbitrary worker threads, but the
    /// scheduler guarantees sequential, non-overlapping invocation of any
    /// single registration.
    Worker,
    /// Single shared cooperative context: all cooperative registrations
    /// interleave on one logical thread and never run truly concurrently.
    #[default]
    Cooperative,
}

/// A recurring tick callback. A returned error terminates the registration;
/// the scheduler logs it and cancels the task chain.
pub type TickCallback = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// A scheduler that invokes a callback once per period, measured in ticks.
pub trait TickScheduler: Send + Sync {
    /// Register `callback` to run every `period_ticks` ticks, starting after
    /// `initial_delay_ticks`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidArgument`] when
    /// `period_ticks` is zero.
    fn schedule_repeating(
        &self,
        mode: ExecutionMode,
        callback: TickCallback,
        initial_delay_ticks: u32,
        period_ticks: u32,
    ) -> Result<TaskHandle>;
}

#[derive(Debug, Default)]
struct HandleState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Handle to an active recurring registration.
///
/// Cloning yields another handle to the same registration. Cancellation is
/// idempotent and safe from any thread, including from inside the tick
/// callback itself.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    inner: Arc<HandleState>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the registration. A tick already in flight is allowed to
    /// finish; no further ticks will start after this returns.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_one();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the handle has been cancelled.
    pub(crate) async fn cancelled(&self) {
        loop {
            // Register interest before re-checking so a cancel between the
            // check and the await is not lost.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
