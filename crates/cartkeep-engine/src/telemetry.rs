//! # Tracing Setup
//!
//! Installs the process-wide tracing subscriber for applications that embed
//! the cart engine.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,cartkeep=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cartkeep_engine=trace` - Trace the engine only
/// - Default: [`DEFAULT_FILTER`]
///
/// Returns `false` if a global subscriber was already installed, so it is
/// safe to call more than once.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
