//! Structured logging setup (§10.1): one `tracing-subscriber` layer,
//! initialized once at process start from `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Call once, before any other
/// `tracing` use.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .init();
}
