#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tickbatch Core
//!
//! A time-sliced batch dispatcher: take a bounded collection, split it into
//! fixed-size partitions, and deliver exactly one partition per recurring
//! scheduler tick to a caller-supplied consumer, self-terminating after the
//! last partition.
//!
//! ## Overview
//!
//! The dispatcher owns no thread or timer of its own. It registers a
//! recurring callback with a [`scheduler::TickScheduler`] collaborator and
//! coordinates a single atomic cursor across ticks, guaranteeing that each
//! partition is delivered exactly once even under concurrent or out-of-order
//! tick delivery, and that shutdown is clean under concurrent cancellation.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tickbatch_core::{BatchDispatcher, TokioTickScheduler};
//!
//! # fn main() -> tickbatch_core::Result<()> {
//! let scheduler = Arc::new(TokioTickScheduler::new()?);
//! let dispatcher = BatchDispatcher::builder((1..=45).collect::<Vec<i32>>())
//!     .consumer(|item: &i32| {
//!         println!("delivering {item}");
//!         Ok(())
//!     })
//!     .partition_size(20)
//!     .scheduler(scheduler)
//!     .start()?;
//! # drop(dispatcher);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`partition`] - Pure, order-preserving fixed-size partitioning
//! - [`dispatcher`] - The batch dispatcher and its builder
//! - [`scheduler`] - Tick scheduler contract plus tokio-backed and manual drivers
//! - [`provider`] - Live-item source collaborator contract
//! - [`lifecycle`] - Terminable resources and the shutdown registry
//! - [`error`] - Structured error handling
//! - [`logging`] - Opt-in `tracing` initialization
//! - [`constants`] - Construction-time defaults
//!
//! ## Known Limitation
//!
//! A consumer error propagates to the scheduler uncaught and terminates the
//! registration, leaving the remaining partitions undelivered. Callers who
//! need partial-failure isolation must wrap their consumer in their own
//! error boundary before handing it in.

pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod partition;
pub mod provider;
pub mod scheduler;

pub use dispatcher::{BatchDispatcher, BatchDispatcherBuilder, Consumer};
pub use error::{ConsumerError, DispatchError, Result};
pub use lifecycle::{ShutdownRegistry, Terminable};
pub use partition::partition;
pub use provider::ItemProvider;
pub use scheduler::manual::{ManualTickScheduler, ScheduledTick};
pub use scheduler::tokio_impl::TokioTickScheduler;
pub use scheduler::{ExecutionMode, TaskHandle, TickCallback, TickScheduler};
