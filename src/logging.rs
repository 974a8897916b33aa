//! `tracing` subscribers for the binary and the tests.
//!
//! The library itself only emits events; installing a subscriber is the
//! caller's job.

use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Logs to stdout, filtered by `RUST_LOG` (default `info`).
///
/// Panics if a global subscriber is already installed.
pub fn init_subscriber() {
    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(LevelFilter::INFO))
        .with(fmt_layer)
        .init();
}

/// Thread-local subscriber that writes through the test harness capture,
/// filtered by `RUST_LOG` (default `debug`).
///
/// Only events on the current thread are captured; work running on rayon
/// workers is not. Keep the guard alive for the duration of the test.
pub fn init_test_subscriber() -> tracing::subscriber::DefaultGuard {
    let fmt_layer = fmt::layer().with_target(true).with_test_writer();

    tracing_subscriber::registry()
        .with(env_filter(LevelFilter::DEBUG))
        .with(fmt_layer)
        .set_default()
}

fn env_filter(default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}
