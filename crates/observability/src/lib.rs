//! Process-wide logging setup.
//!
//! The ledger crates emit structured `tracing` events (appends, recomputes,
//! backdating warnings); this crate installs the subscriber that renders
//! them.

use tracing_subscriber::EnvFilter;

/// Install the JSON tracing subscriber for this process.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
