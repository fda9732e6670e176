//! Diagnostic logging
//!
//! `tracing` events are written to stderr. `RUST_LOG` takes precedence; when
//! it is unset the level follows the console verbosity.

use crate::ui::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: Verbosity) {
    let default_level = match verbosity {
        Verbosity::Silent => "off",
        Verbosity::Quiet | Verbosity::Normal => "warn",
        Verbosity::Verbose => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taskchain={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
