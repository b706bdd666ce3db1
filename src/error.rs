//! Run-level errors.
//!
//! Only structurally missing input aborts a run. Per-operation problems
//! (empty pool, shortfall) are reported in
//! [`OperationStatus`](crate::models::OperationStatus), and skipped rows in
//! [`Allocation::issues`](crate::models::Allocation).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("No candidates available after validation ({skipped} skipped)")]
    NoCandidates { skipped: usize },

    #[error("No operations available after validation ({skipped} skipped)")]
    NoOperations { skipped: usize },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfigValue { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, AllocationError>;
