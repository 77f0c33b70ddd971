//! Tracing initialization with configurable log level.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes tracing with the default level.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initializes tracing, preferring `RUST_LOG` from the environment over
/// the provided level string. Safe to call more than once.
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
