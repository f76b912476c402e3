//! Error types for query execution

use thiserror::Error;

/// Query execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The execution ran more tasks than its fuel budget allows
    #[error("Fuel limit exceeded: used {used} of {limit}")]
    FuelLimitExceeded { used: u64, limit: u64 },

    /// `run` was called on an execution that already failed
    #[error("Query execution aborted - create a new execution to retry")]
    ExecutionAborted,
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
