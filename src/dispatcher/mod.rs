//! # Batch Dispatcher
//!
//! The time-sliced delivery primitive. A dispatcher owns an immutable list
//! of partitions computed once at build time, an atomic cursor, and a handle
//! to a recurring registration obtained from the scheduler collaborator. On
//! each tick it delivers exactly one partition to the caller-supplied
//! consumer and self-terminates after the last one.
//!
//! Exactly-once delivery holds even if the scheduler, contrary to its
//! contract, delivers ticks concurrently: the cursor is claimed with a
//! single atomic fetch-and-add, so no partition can be repeated or skipped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ConsumerError, DispatchError, Result};
use crate::lifecycle::Terminable;
use crate::scheduler::{ExecutionMode, TaskHandle, TickCallback, TickScheduler};

mod builder;

pub use builder::BatchDispatcherBuilder;

/// Per-item delivery callback. A returned error propagates to the scheduler
/// uncaught; the dispatcher never retries or skips on failure.
pub type Consumer<T> = Arc<dyn Fn(&T) -> std::result::Result<(), ConsumerError> + Send + Sync>;

// The scheduler handle lives on `BatchDispatcher` rather than here: the tick
// callback captures an `Arc<Inner>`, and routing the scheduler through it
// would let a scheduler-owned task keep its own scheduler alive.
pub(crate) struct Inner<T> {
    id: Uuid,
    partitions: Vec<Vec<T>>,
    cursor: AtomicUsize,
    consumer: Consumer<T>,
    mode: ExecutionMode,
    interval_ticks: u32,
    schedule: Mutex<Option<TaskHandle>>,
}

impl<T> Inner<T> {
    /// Release the active registration, if any. Idempotent.
    fn stop(&self) {
        if let Some(handle) = self.schedule.lock().take() {
            handle.cancel();
            debug!(dispatcher_id = %self.id, "dispatcher stopped");
        }
    }

    /// One scheduler tick: claim the next cursor value, deliver that
    /// partition, and self-stop once the cursor has passed the end.
    fn run_tick(&self) -> Result<()> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        if index >= self.partitions.len() {
            debug!(dispatcher_id = %self.id, "all partitions delivered, releasing schedule");
            self.stop();
            return Ok(());
        }

        for item in &self.partitions[index] {
            (self.consumer)(item).map_err(DispatchError::ConsumerFailure)?;
        }
        Ok(())
    }
}

/// Drives a partitioned collection through a consumer, one partition per
/// scheduler tick.
///
/// Cloning is cheap and yields another handle to the same dispatcher, which
/// is how the tick callback and lifecycle bindings share state with the
/// caller. A dispatcher is single-use: the cursor never rewinds.
pub struct BatchDispatcher<T> {
    inner: Arc<Inner<T>>,
    scheduler: Arc<dyn TickScheduler>,
}

impl<T> Clone for BatchDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<T: Send + Sync + 'static> BatchDispatcher<T> {
    /// Start building a dispatcher over an explicit item collection.
    pub fn builder(items: Vec<T>) -> BatchDispatcherBuilder<T> {
        BatchDispatcherBuilder::new(items)
    }

    /// Start building a dispatcher over a snapshot of the provider's live
    /// items, keeping only those matching `filter`.
    pub fn from_provider<P, F>(provider: &P, filter: F) -> BatchDispatcherBuilder<T>
    where
        P: crate::provider::ItemProvider<T> + ?Sized,
        F: FnMut(&T) -> bool,
    {
        BatchDispatcherBuilder::new(provider.live_items().into_iter().filter(filter).collect())
    }

    pub(crate) fn from_inner(inner: Inner<T>, scheduler: Arc<dyn TickScheduler>) -> Self {
        Self {
            inner: Arc::new(inner),
            scheduler,
        }
    }

    /// Register the recurring tick callback with the scheduler collaborator.
    ///
    /// A no-op when there are zero partitions: nothing is scheduled and the
    /// dispatcher is immediately equivalent to stopped.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::IllegalState`] when a registration is
    /// already active, and propagates scheduler registration failures.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.inner.schedule.lock();
        if let Some(handle) = slot.as_ref() {
            if !handle.is_cancelled() {
                return Err(DispatchError::IllegalState(
                    "dispatcher is already running".to_string(),
                ));
            }
        }

        if self.inner.partitions.is_empty() {
            debug!(dispatcher_id = %self.inner.id, "no partitions to deliver, start is a no-op");
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        let callback: TickCallback = Arc::new(move || inner.run_tick());
        let handle = self.scheduler.schedule_repeating(
            self.inner.mode,
            callback,
            0,
            self.inner.interval_ticks,
        )?;

        info!(
            dispatcher_id = %self.inner.id,
            partitions = self.inner.partitions.len(),
            mode = ?self.inner.mode,
            interval_ticks = self.inner.interval_ticks,
            "dispatcher started"
        );
        *slot = Some(handle);
        Ok(())
    }

    /// Cancel the active registration, if any. Idempotent, never an error,
    /// safe from any thread and concurrently with an in-flight tick (which
    /// is allowed to finish its current partition).
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Whether a non-cancelled registration is currently active.
    pub fn is_running(&self) -> bool {
        self.inner
            .schedule
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    pub fn partition_count(&self) -> usize {
        self.inner.partitions.len()
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }
}

impl<T: Send + Sync + 'static> Terminable for BatchDispatcher<T> {
    fn terminate(&self) {
        self.stop();
    }
}
