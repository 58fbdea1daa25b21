//! Developer logging.
//!
//! The event log is the operator's record; this is the `tracing` side
//! channel for sequencer steps, rejected requests and host lifecycle.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` (default
/// `info`). Stdout is left to the drill report.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
