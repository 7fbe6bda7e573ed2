//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and tests. Users can install their own
/// subscriber first; this helper is a no-op when a dispatcher is already set.
///
/// Loads `.env` so `RUST_LOG` can live there, then installs an env-filtered
/// fmt subscriber falling back to `tierpool=info` when no filter is
/// configured.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = dotenvy::dotenv();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tierpool=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
