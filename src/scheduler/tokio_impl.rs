//! # Tokio Tick Scheduler
//!
//! Production [`TickScheduler`] backed by tokio timers. The scheduler owns
//! both execution contexts outright: a multi-thread runtime for isolated
//! worker registrations and a dedicated current-thread runtime, parked on
//! its own OS thread, for the shared cooperative context. Nothing here
//! requires an ambient tokio runtime in the caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Handle, Runtime};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::constants::DEFAULT_TICK_DURATION;
use crate::error::{DispatchError, Result};

use super::{ExecutionMode, TaskHandle, TickCallback, TickScheduler};

/// Tokio-backed recurring-tick scheduler.
///
/// A "tick" is an abstract scheduling quantum; its wall-clock length is fixed
/// at construction ([`DEFAULT_TICK_DURATION`] unless overridden) and applies
/// to every registration.
pub struct TokioTickScheduler {
    tick: Duration,
    worker_handle: Handle,
    worker: Option<Runtime>,
    cooperative: CooperativeContext,
}

impl TokioTickScheduler {
    /// Build a scheduler with the default tick quantum.
    pub fn new() -> Result<Self> {
        Self::with_tick(DEFAULT_TICK_DURATION)
    }

    /// Build a scheduler whose ticks last `tick` of wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] for a zero tick and
    /// [`DispatchError::Scheduler`] when a runtime cannot be built.
    pub fn with_tick(tick: Duration) -> Result<Self> {
        if tick.is_zero() {
            return Err(DispatchError::InvalidArgument(
                "tick duration must be non-zero".to_string(),
            ));
        }

        let worker = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("tickbatch-worker")
            .build()
            .map_err(|e| DispatchError::Scheduler(format!("failed to build worker runtime: {e}")))?;
        let worker_handle = worker.handle().clone();
        let cooperative = CooperativeContext::spawn()?;

        Ok(Self {
            tick,
            worker_handle,
            worker: Some(worker),
            cooperative,
        })
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }
}

impl TickScheduler for TokioTickScheduler {
    fn schedule_repeating(
        &self,
        mode: ExecutionMode,
        callback: TickCallback,
        initial_delay_ticks: u32,
        period_ticks: u32,
    ) -> Result<TaskHandle> {
        if period_ticks == 0 {
            return Err(DispatchError::InvalidArgument(
                "period must be at least one tick".to_string(),
            ));
        }

        let handle = TaskHandle::new();
        let task = handle.clone();
        let tick = self.tick;

        let driver = async move {
            let start = tokio::time::Instant::now() + tick * initial_delay_ticks;
            let mut ticker = tokio::time::interval_at(start, tick * period_ticks);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if task.is_cancelled() {
                            break;
                        }
                        if let Err(e) = (callback)() {
                            error!(error = %e, "repeating task failed, cancelling registration");
                            task.cancel();
                            break;
                        }
                    }
                    () = task.cancelled() => break,
                }
            }
        };

        match mode {
            ExecutionMode::Worker => {
                self.worker_handle.spawn(driver);
            }
            ExecutionMode::Cooperative => {
                self.cooperative.handle.spawn(driver);
            }
        }

        debug!(?mode, initial_delay_ticks, period_ticks, "registered repeating task");
        Ok(handle)
    }
}

impl Drop for TokioTickScheduler {
    fn drop(&mut self) {
        if let Some(runtime) = self.worker.take() {
            runtime.shutdown_background();
        }
        self.cooperative.shutdown();
    }
}

/// The shared cooperative context: one current-thread runtime parked on a
/// named OS thread, driving every cooperative registration interleaved.
struct CooperativeContext {
    handle: Handle,
    stop: Arc<Notify>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl CooperativeContext {
    fn spawn() -> Result<Self> {
        let stop = Arc::new(Notify::new());
        let park = Arc::clone(&stop);
        let (tx, rx) = std::sync::mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("tickbatch-coop".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = tx.send(Err(DispatchError::Scheduler(format!(
                            "failed to build cooperative runtime: {e}"
                        ))));
                        return;
                    }
                };
                let _ = tx.send(Ok(runtime.handle().clone()));
                // Park until shutdown; block_on drives every task spawned
                // onto this runtime's handle in the meantime.
                runtime.block_on(async move { park.notified().await });
            })
            .map_err(|e| {
                DispatchError::Scheduler(format!("failed to spawn cooperative thread: {e}"))
            })?;

        let handle = rx.recv().map_err(|_| {
            DispatchError::Scheduler("cooperative thread exited before initialising".to_string())
        })??;

        Ok(Self {
            handle,
            stop,
            thread: Some(thread),
        })
    }

    fn shutdown(&mut self) {
        self.stop.notify_one();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
