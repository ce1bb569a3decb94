//! Service-level error taxonomy for task commands and queries.

use crate::task::{
    domain::{AggregateId, TaskDomainError, TaskId, TaskValidationError, Version},
    ports::{CatalogError, EventStoreError},
};
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
///
/// No variant is ever produced after a partial append: every error path
/// leaves the event store untouched.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Command fields are malformed; detected before any aggregate is loaded.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// The command is illegal in the aggregate's current state.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// No events exist for the aggregate.
    #[error("task aggregate not found: {0}")]
    AggregateNotFound(AggregateId),

    /// The catalog has no such task.
    #[error("catalog task not found: {0}")]
    CatalogTaskNotFound(TaskId),

    /// The catalog task has been retired.
    #[error("catalog task {0} is not active")]
    CatalogTaskInactive(TaskId),

    /// A non-terminal aggregate already holds the catalog task.
    #[error("task {task_id} is already assigned as {holder}")]
    AlreadyAssigned {
        /// Contested catalog task.
        task_id: TaskId,
        /// Aggregate holding it.
        holder: AggregateId,
    },

    /// Another writer appended first and retries were exhausted.
    #[error("task {aggregate_id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        /// Contested aggregate.
        aggregate_id: AggregateId,
        /// Version read at load time.
        expected: Version,
        /// Version found at append time.
        actual: Version,
    },

    /// Event store I/O failed; nothing was appended.
    #[error("event store failure: {0}")]
    EventStore(EventStoreError),

    /// Catalog I/O failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Coarse classification used by transport layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Malformed input (schema validation).
    Validation,
    /// Unknown aggregate or catalog task.
    NotFound,
    /// Domain rule violation.
    DomainRule,
    /// Optimistic concurrency race lost.
    Conflict,
    /// Storage failure.
    Infrastructure,
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn class(&self) -> FailureClass {
        match self {
            Self::Validation(_) => FailureClass::Validation,
            Self::AggregateNotFound(_) | Self::CatalogTaskNotFound(_) => FailureClass::NotFound,
            Self::Domain(_) | Self::CatalogTaskInactive(_) | Self::AlreadyAssigned { .. } => {
                FailureClass::DomainRule
            }
            Self::Conflict { .. } => FailureClass::Conflict,
            Self::EventStore(_) | Self::Catalog(_) => FailureClass::Infrastructure,
        }
    }

    /// Returns `true` when repeating the command may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.class(),
            FailureClass::Conflict | FailureClass::Infrastructure
        )
    }
}

impl From<EventStoreError> for TaskLifecycleError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::Conflict {
                aggregate_id,
                expected,
                actual,
            } => Self::Conflict {
                aggregate_id,
                expected,
                actual,
            },
            EventStoreError::TaskClaimed { task_id, holder } => {
                Self::AlreadyAssigned { task_id, holder }
            }
            EventStoreError::Persistence(_) => Self::EventStore(err),
        }
    }
}
