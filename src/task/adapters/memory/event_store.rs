//! In-memory event store for tests and embedded use.

use crate::task::{
    domain::{AggregateId, TaskEvent, TaskId, Version},
    ports::{EventStoreError, EventStoreResult, TaskEventStore},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory implementation of [`TaskEventStore`].
///
/// A single write lock makes every append a compare-and-append, so two
/// writers racing on the same expected version cannot both succeed.
///
/// # Example
///
/// ```
/// use taskquest::task::adapters::memory::InMemoryTaskEventStore;
///
/// let store = InMemoryTaskEventStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskEventStore {
    state: Arc<RwLock<InMemoryEventState>>,
}

#[derive(Debug, Default)]
struct InMemoryEventState {
    streams: HashMap<AggregateId, Vec<TaskEvent>>,
    log: Vec<TaskEvent>,
    claims: HashMap<TaskId, AggregateId>,
}

impl InMemoryTaskEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored events.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map(|guard| guard.log.len()).unwrap_or(0)
    }

    /// Returns `true` if no events are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(err: &impl ToString) -> EventStoreError {
    EventStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskEventStore for InMemoryTaskEventStore {
    async fn append(
        &self,
        expected_version: Version,
        event: &TaskEvent,
    ) -> EventStoreResult<Version> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let aggregate_id = event.aggregate_id();

        let actual = state
            .streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(Version::INITIAL, TaskEvent::sequence);
        if actual != expected_version || event.sequence() != expected_version.next() {
            return Err(EventStoreError::Conflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        if let Some(task_id) = event.claimed_task() {
            if let Some(holder) = state.claims.get(&task_id) {
                return Err(EventStoreError::TaskClaimed {
                    task_id,
                    holder: *holder,
                });
            }
            state.claims.insert(task_id, aggregate_id);
        }
        if event.kind().is_terminal() {
            state.claims.retain(|_, holder| *holder != aggregate_id);
        }

        state
            .streams
            .entry(aggregate_id)
            .or_default()
            .push(event.clone());
        state.log.push(event.clone());
        Ok(event.sequence())
    }

    async fn read_all(&self, aggregate_id: AggregateId) -> EventStoreResult<Vec<TaskEvent>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state
            .streams
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn read_stream(&self) -> EventStoreResult<Vec<TaskEvent>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.log.clone())
    }

    async fn active_aggregate_for(
        &self,
        task_id: TaskId,
    ) -> EventStoreResult<Option<AggregateId>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.claims.get(&task_id).copied())
    }
}
