//! # Dispatch Defaults
//!
//! Construction-time defaults for the batch dispatcher. All of these can be
//! overridden through the builder; none are read from the environment.

use std::time::Duration;

/// Default number of items per partition.
pub const DEFAULT_PARTITION_SIZE: usize = 20;

/// Default delivery cadence: one partition per scheduler tick.
pub const DEFAULT_TICK_INTERVAL_TICKS: u32 = 1;

/// Default wall-clock length of a single scheduler tick for the tokio-backed
/// scheduler. Hosts that drive time themselves ignore this entirely.
pub const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(50);
