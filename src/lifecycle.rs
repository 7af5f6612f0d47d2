//! # Resource Lifecycle
//!
//! A small "cleanup on scope exit" registry. Long-lived owners (a plugin, a
//! service, a test harness) register terminable resources and tear all of
//! them down with a single idempotent [`ShutdownRegistry::close`]. The batch
//! dispatcher implements [`Terminable`] so binding it to a registry means
//! closing the registry also stops the dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::debug;

/// A resource with an idempotent teardown operation.
///
/// `terminate` must be safe to call more than once and from any thread.
pub trait Terminable: Send + Sync {
    fn terminate(&self);
}

/// Collects terminable resources and tears them down together.
///
/// Hooks run in reverse registration order, mirroring drop order for values
/// constructed in sequence. Registering against an already-closed registry
/// terminates the hook immediately instead of leaking it.
#[derive(Default)]
pub struct ShutdownRegistry {
    hooks: Mutex<Vec<Box<dyn Terminable>>>,
    closed: AtomicBool,
}

impl ShutdownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource to be terminated when this registry closes.
    pub fn register(&self, hook: Box<dyn Terminable>) {
        if self.closed.load(Ordering::Acquire) {
            hook.terminate();
            return;
        }
        self.hooks.lock().push(hook);
    }

    /// Terminate every registered resource, newest first. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Drain outside the lock so a hook's teardown can touch the registry
        // without deadlocking.
        let hooks = std::mem::take(&mut *self.hooks.lock());
        debug!(hook_count = hooks.len(), "closing shutdown registry");
        for hook in hooks.iter().rev() {
            hook.terminate();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
