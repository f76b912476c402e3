//! Query execution options

use serde::Deserialize;

/// Limits applied to a single query execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Maximum number of match tasks to run; `None` is unlimited
    ///
    /// One unit of fuel is spent per task popped off the work queue, so the
    /// budget bounds work done, not results produced.
    pub max_fuel: Option<u64>,
}

impl QueryOptions {
    /// Create options with no limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fuel budget
    pub fn with_max_fuel(mut self, fuel: u64) -> Self {
        self.max_fuel = Some(fuel);
        self
    }
}
