//! Tracing subscriber setup for the CLI.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter, e.g. `methodlens=debug`.
pub const LOG_ENV: &str = "METHODLENS_LOG";

static INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `METHODLENS_LOG`.
///
/// Falls back to `methodlens=info`, or `methodlens=debug` when `debug` is set.
/// Safe to call more than once.
pub fn init_logging(debug: bool) {
    INIT.call_once(|| {
        let fallback = if debug {
            "methodlens=debug"
        } else {
            "methodlens=info"
        };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .without_time(),
            )
            .with(filter)
            .try_init();
    });
}
