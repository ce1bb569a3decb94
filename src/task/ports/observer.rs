//! Port for projections that react to newly appended task events.

use crate::task::domain::{TaskAggregate, TaskEvent};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Receives every event after it has been durably appended.
///
/// Observers run after the command is decided; their failures never undo the
/// append, so they must be able to catch up by replaying the event log.
#[async_trait]
pub trait TaskEventObserver: Send + Sync {
    /// Handles `event`; `task` is the aggregate state after the event.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError`] when the projection could not be updated.
    async fn on_event(&self, task: &TaskAggregate, event: &TaskEvent) -> Result<(), ObserverError>;
}

/// Failure reported by a [`TaskEventObserver`].
#[derive(Debug, Clone, Error)]
#[error("{observer} failed: {cause}")]
pub struct ObserverError {
    /// Name of the failing observer.
    pub observer: &'static str,
    /// Underlying failure.
    pub cause: Arc<dyn std::error::Error + Send + Sync>,
}

impl ObserverError {
    /// Wraps a failure raised by `observer`.
    pub fn new(
        observer: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            observer,
            cause: Arc::new(err),
        }
    }
}
