//! # Structured Logging
//!
//! Environment-aware `tracing` initialization for binaries and tests that
//! embed the dispatch core. Libraries should not install a subscriber on
//! their own, so this is opt-in and guarded so repeated calls are harmless.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging with an `RUST_LOG`-style environment filter.
///
/// Safe to call more than once; only the first call installs a subscriber,
/// and an already-installed global subscriber is left untouched.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_filter(filter),
            )
            .try_init();
    });
}
