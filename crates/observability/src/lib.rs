//! Tracing and logging setup shared by pricewatch processes.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, init, init_with_filter};
