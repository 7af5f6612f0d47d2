//! # Structured Error Handling
//!
//! Error taxonomy for the batch dispatch core. Construction-time problems
//! (bad partition size, missing collaborators) surface synchronously as
//! [`DispatchError::InvalidArgument`]; lifecycle misuse surfaces as
//! [`DispatchError::IllegalState`]; a failing consumer propagates through the
//! tick callback as [`DispatchError::ConsumerFailure`] and is never retried.

use thiserror::Error;

/// Boxed error produced by a caller-supplied consumer.
pub type ConsumerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the batch dispatch core.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A construction-time argument was invalid. Dispatchers are never
    /// created in an invalid state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A lifecycle operation was called in the wrong state, e.g. `start()`
    /// on a dispatcher that is already running.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The scheduler collaborator could not be set up or used.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// A caller-supplied consumer failed during a tick. The dispatcher does
    /// not catch or retry this; it propagates to the scheduler, whose
    /// failure policy governs the outcome.
    #[error("consumer failure: {0}")]
    ConsumerFailure(#[source] ConsumerError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
