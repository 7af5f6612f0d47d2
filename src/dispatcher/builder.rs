//! Construction surface for [`BatchDispatcher`]. All configuration happens
//! here; a built dispatcher is immutable apart from its cursor and schedule
//! slot, and is never created in an invalid state.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::constants::{DEFAULT_PARTITION_SIZE, DEFAULT_TICK_INTERVAL_TICKS};
use crate::error::{ConsumerError, DispatchError, Result};
use crate::lifecycle::ShutdownRegistry;
use crate::partition::partition;
use crate::scheduler::{ExecutionMode, TickScheduler};

use super::{BatchDispatcher, Consumer, Inner};

/// Builder for [`BatchDispatcher`].
///
/// Obtained via [`BatchDispatcher::builder`] or
/// [`BatchDispatcher::from_provider`].
pub struct BatchDispatcherBuilder<T> {
    items: Vec<T>,
    consumer: Option<Consumer<T>>,
    partition_size: usize,
    mode: ExecutionMode,
    interval_ticks: u32,
    scheduler: Option<Arc<dyn TickScheduler>>,
    registry: Option<Arc<ShutdownRegistry>>,
}

impl<T: Send + Sync + 'static> BatchDispatcherBuilder<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items,
            consumer: None,
            partition_size: DEFAULT_PARTITION_SIZE,
            mode: ExecutionMode::default(),
            interval_ticks: DEFAULT_TICK_INTERVAL_TICKS,
            scheduler: None,
            registry: None,
        }
    }

    /// The per-item delivery callback. Required.
    pub fn consumer<F>(mut self, consumer: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), ConsumerError> + Send + Sync + 'static,
    {
        self.consumer = Some(Arc::new(consumer));
        self
    }

    /// Items per partition. Defaults to
    /// [`DEFAULT_PARTITION_SIZE`](crate::constants::DEFAULT_PARTITION_SIZE).
    pub fn partition_size(mut self, size: usize) -> Self {
        self.partition_size = size;
        self
    }

    /// Which scheduler context ticks run in. Defaults to
    /// [`ExecutionMode::Cooperative`].
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ticks between partition deliveries. Defaults to
    /// [`DEFAULT_TICK_INTERVAL_TICKS`](crate::constants::DEFAULT_TICK_INTERVAL_TICKS).
    pub fn interval_ticks(mut self, ticks: u32) -> Self {
        self.interval_ticks = ticks;
        self
    }

    /// The scheduler collaborator to register the recurring tick with.
    /// Required.
    pub fn scheduler(mut self, scheduler: Arc<dyn TickScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Bind the dispatcher's lifecycle to `registry`: closing the registry
    /// also stops the dispatcher.
    pub fn bind_to(mut self, registry: &Arc<ShutdownRegistry>) -> Self {
        self.registry = Some(Arc::clone(registry));
        self
    }

    /// Validate the configuration and build the dispatcher.
    ///
    /// Partitions are computed here, once; they are immutable afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] for a zero partition size,
    /// a zero tick interval, or a missing consumer or scheduler.
    pub fn build(self) -> Result<BatchDispatcher<T>> {
        if self.partition_size == 0 {
            return Err(DispatchError::InvalidArgument(
                "partition size must be at least 1".to_string(),
            ));
        }
        if self.interval_ticks == 0 {
            return Err(DispatchError::InvalidArgument(
                "tick interval must be at least 1".to_string(),
            ));
        }
        let consumer = self.consumer.ok_or_else(|| {
            DispatchError::InvalidArgument("a consumer is required".to_string())
        })?;
        let scheduler = self.scheduler.ok_or_else(|| {
            DispatchError::InvalidArgument("a scheduler is required".to_string())
        })?;

        let partitions = partition(self.items, self.partition_size)?;

        let dispatcher = BatchDispatcher::from_inner(
            Inner {
                id: Uuid::new_v4(),
                partitions,
                cursor: AtomicUsize::new(0),
                consumer,
                mode: self.mode,
                interval_ticks: self.interval_ticks,
                schedule: Mutex::new(None),
            },
            scheduler,
        );

        if let Some(registry) = self.registry {
            registry.register(Box::new(dispatcher.clone()));
        }

        Ok(dispatcher)
    }

    /// Build the dispatcher and immediately start it.
    pub fn start(self) -> Result<BatchDispatcher<T>> {
        let dispatcher = self.build()?;
        dispatcher.start()?;
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::manual::ManualTickScheduler;

    fn scheduler() -> Arc<ManualTickScheduler> {
        Arc::new(ManualTickScheduler::new())
    }

    #[test]
    fn zero_partition_size_is_rejected() {
        let result = BatchDispatcher::builder(vec![1])
            .consumer(|_: &i32| Ok(()))
            .scheduler(scheduler())
            .partition_size(0)
            .build();
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = BatchDispatcher::builder(vec![1])
            .consumer(|_: &i32| Ok(()))
            .scheduler(scheduler())
            .interval_ticks(0)
            .build();
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[test]
    fn missing_consumer_is_rejected() {
        let result = BatchDispatcher::<i32>::builder(vec![1])
            .scheduler(scheduler())
            .build();
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[test]
    fn missing_scheduler_is_rejected() {
        let result = BatchDispatcher::builder(vec![1]).consumer(|_: &i32| Ok(())).build();
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[test]
    fn defaults_partition_into_groups_of_twenty() {
        let dispatcher = BatchDispatcher::builder((1..=45).collect::<Vec<i32>>())
            .consumer(|_: &i32| Ok(()))
            .scheduler(scheduler())
            .build()
            .unwrap();
        assert_eq!(dispatcher.partition_count(), 3);
    }

    #[test]
    fn builder_start_builds_and_starts() {
        let scheduler = scheduler();
        let dispatcher = BatchDispatcher::builder(vec![1, 2, 3])
            .consumer(|_: &i32| Ok(()))
            .scheduler(scheduler.clone())
            .start()
            .unwrap();

        assert!(dispatcher.is_running());
        assert_eq!(scheduler.active_count(), 1);
    }
}
