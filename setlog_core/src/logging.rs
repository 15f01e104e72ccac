//! Tracing setup shared by the setlog binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber at INFO, overridable via `RUST_LOG`.
pub fn init() {
    init_with_level("info")
}

/// Install the global subscriber with an explicit default level.
///
/// `RUST_LOG` still wins when set, so a deployed binary can be turned up
/// to debug without a rebuild.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Capture debug-level output into the test harness writer.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
