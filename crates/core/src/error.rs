//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (malformed
/// identifiers, missing records, conflicts). Storage failures belong to the store
/// boundary of each domain crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier could not be parsed from its textual form.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. re-assigning an immutable identifier).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The current calendar date could not be determined.
    #[error("clock unavailable: {0}")]
    Clock(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn clock(msg: impl Into<String>) -> Self {
        Self::Clock(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
