//! Progression store port with revision-checked saves.

use crate::progression::domain::EmployeeProgression;
use crate::task::domain::EmployeeId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for progression store operations.
pub type ProgressionStoreResult<T> = Result<T, ProgressionStoreError>;

/// Persistence contract for employee progression.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - an absent employee is at revision 0
/// - `save` succeeds only when the stored revision equals
///   `expected_revision`, and then stores revision `expected_revision + 1`
/// - `replace` swaps the whole projection atomically
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionStore: Send + Sync {
    /// Loads the progression of `employee`, if any XP was ever credited.
    async fn load(&self, employee: EmployeeId) -> ProgressionStoreResult<Option<EmployeeProgression>>;

    /// Stores `progression` if nobody saved since `expected_revision`.
    ///
    /// Returns the new revision.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionStoreError::Conflict`] when the stored revision
    /// moved on, or [`ProgressionStoreError::Persistence`] on I/O failure.
    async fn save(
        &self,
        progression: &EmployeeProgression,
        expected_revision: u64,
    ) -> ProgressionStoreResult<u64>;

    /// Returns every stored progression, ordered by employee.
    async fn list(&self) -> ProgressionStoreResult<Vec<EmployeeProgression>>;

    /// Replaces every stored progression with `progressions`.
    async fn replace(&self, progressions: Vec<EmployeeProgression>) -> ProgressionStoreResult<()>;
}

/// Errors returned by progression store implementations.
#[derive(Debug, Clone, Error)]
pub enum ProgressionStoreError {
    /// Another writer saved first.
    #[error("progression of {employee} is at revision {actual}, expected {expected}")]
    Conflict {
        /// Contested employee.
        employee: EmployeeId,
        /// Revision the writer loaded.
        expected: u64,
        /// Revision found at save time.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProgressionStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
