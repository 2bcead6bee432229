//! Tracing/logging initialization.
//!
//! JSON logs with timestamps, filtered through `RUST_LOG`. Offer recording
//! reports swallowed date-normalization failures at `warn`, so the default
//! filter keeps warnings visible.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Returns `true`
/// if this call installed the global subscriber.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Like [`init`], but with an explicit filter directive that ignores
/// `RUST_LOG` (e.g. `"pricewatch_offers=debug,info"`). An unparseable
/// directive falls back to [`DEFAULT_FILTER`].
pub fn init_with_filter(directives: &str) -> bool {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
