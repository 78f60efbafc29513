//! Tracing subscriber setup for binaries embedding the generated routes.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "autocrud=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
/// Returns false when a global subscriber was already set.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}
