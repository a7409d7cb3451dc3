//! Logging setup
//!
//! Structured tracing via `tracing-subscriber`, filtered through `RUST_LOG`
//! with an `info` default. JSON output is for log shippers; the plain format
//! is for local development.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if let Err(error) = result {
        tracing::debug!(%error, "Tracing subscriber already initialized");
    }
}
