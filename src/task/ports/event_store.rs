//! Event store port: the append-only source of truth for task streams.

use crate::task::domain::{AggregateId, TaskEvent, TaskId, Version};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event store operations.
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Append-only, per-aggregate ordered event log.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `append` is an atomic compare-and-append: of two appends carrying the
///   same `expected_version`, exactly one succeeds
/// - sequences within an aggregate are gapless and start at 1
/// - an `Assigned` event claims its catalog task until a terminal event is
///   appended to the same aggregate, and a second claim is refused
/// - a failed append leaves no trace
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskEventStore: Send + Sync {
    /// Appends `event` if the stream head is still `expected_version`.
    ///
    /// Returns the new stream version.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Conflict`] when the stream moved on,
    /// [`EventStoreError::TaskClaimed`] when an `Assigned` event targets a
    /// catalog task that is already held, or
    /// [`EventStoreError::Persistence`] on I/O failure.
    async fn append(&self, expected_version: Version, event: &TaskEvent)
    -> EventStoreResult<Version>;

    /// Returns the ordered history of one aggregate.
    ///
    /// Returns an empty vector for unknown aggregates.
    async fn read_all(&self, aggregate_id: AggregateId) -> EventStoreResult<Vec<TaskEvent>>;

    /// Returns every event across all aggregates in commit order.
    async fn read_stream(&self) -> EventStoreResult<Vec<TaskEvent>>;

    /// Returns the aggregate currently holding `task_id`, if any.
    async fn active_aggregate_for(&self, task_id: TaskId)
    -> EventStoreResult<Option<AggregateId>>;
}

/// Errors returned by event store implementations.
#[derive(Debug, Clone, Error)]
pub enum EventStoreError {
    /// Optimistic concurrency check failed.
    #[error("stream {aggregate_id} is at version {actual}, expected {expected}")]
    Conflict {
        /// Stream that was modified concurrently.
        aggregate_id: AggregateId,
        /// Version the writer loaded.
        expected: Version,
        /// Version found at append time.
        actual: Version,
    },

    /// The catalog task is already held by another active aggregate.
    #[error("task {task_id} is already held by {holder}")]
    TaskClaimed {
        /// Contested catalog task.
        task_id: TaskId,
        /// Aggregate holding the claim.
        holder: AggregateId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
