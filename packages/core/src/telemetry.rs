//! Shared tracing bootstrap so every binary logs identically.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a `tracing_subscriber` registry honoring `LOG_LEVEL`/`RUST_LOG`.
/// Safe to call once per process, at the top of `main`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();
}
