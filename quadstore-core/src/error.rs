//! Error types for quadstore-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store error type
///
/// Lookups never fail: absent buckets resolve to empty results. Only caller
/// contract violations surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `remove` was asked for a statement the store does not hold
    #[error("Statement not found: {0}")]
    StatementNotFound(String),

    /// A sink was handed a term id it never issued
    #[error("Unknown term id: {0}")]
    UnknownTermId(u32),
}
