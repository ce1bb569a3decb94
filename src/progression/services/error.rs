//! Error types for the progression projector.

use crate::progression::ports::ProgressionStoreError;
use crate::task::domain::{EmployeeId, TaskDomainError};
use thiserror::Error;

/// Errors raised while projecting task events into progression.
#[derive(Debug, Clone, Error)]
pub enum ProgressionError {
    /// The replayed event log is inconsistent.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Saves kept losing revision races.
    #[error("progression of {employee} kept changing; gave up after {attempts} attempts")]
    Contended {
        /// Contested employee.
        employee: EmployeeId,
        /// Save attempts made.
        attempts: u32,
    },

    /// The progression store failed.
    #[error(transparent)]
    Store(#[from] ProgressionStoreError),
}

/// Result type for progression projector operations.
pub type ProgressionResult<T> = Result<T, ProgressionError>;
