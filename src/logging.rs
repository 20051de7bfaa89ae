//! Logging bootstrap for binaries and tests embedding cloudstore.
//!
//! Library code logs through the `log` facade; `init` installs a
//! `tracing-subscriber` formatter that also receives those records.
//! `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns `false` when one is already set.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// JSON-formatted variant of [`init`] for log shippers.
pub fn init_json(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
