//! Structured logging initialization.
//!
//! The core only *emits* leveled `tracing` events (method, path, status,
//! request id, latency, error detail); where they go is the subscriber's
//! business. This helper installs a sensible default for binaries that do
//! not bring their own: a fmt subscriber whose level honours the
//! [`Config::debug`](crate::Config::debug) flag, with `RUST_LOG` taking
//! precedence when set.

use tracing_subscriber::EnvFilter;

/// Installs the default `tracing` subscriber.
///
/// Idempotent: if a subscriber is already installed (by the host binary or
/// an earlier call), this is a no-op.
pub fn init(debug: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
