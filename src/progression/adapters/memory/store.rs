//! In-memory progression store.

use crate::progression::{
    domain::EmployeeProgression,
    ports::{ProgressionStore, ProgressionStoreError, ProgressionStoreResult},
};
use crate::task::domain::EmployeeId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory implementation of [`ProgressionStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressionStore {
    progressions: Arc<RwLock<HashMap<EmployeeId, EmployeeProgression>>>,
}

impl InMemoryProgressionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: &impl ToString) -> ProgressionStoreError {
    ProgressionStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ProgressionStore for InMemoryProgressionStore {
    async fn load(
        &self,
        employee: EmployeeId,
    ) -> ProgressionStoreResult<Option<EmployeeProgression>> {
        let progressions = self.progressions.read().map_err(|err| lock_error(&err))?;
        Ok(progressions.get(&employee).cloned())
    }

    async fn save(
        &self,
        progression: &EmployeeProgression,
        expected_revision: u64,
    ) -> ProgressionStoreResult<u64> {
        let mut progressions = self.progressions.write().map_err(|err| lock_error(&err))?;
        let employee = progression.employee();
        let actual = progressions
            .get(&employee)
            .map_or(0, EmployeeProgression::revision);
        if actual != expected_revision {
            return Err(ProgressionStoreError::Conflict {
                employee,
                expected: expected_revision,
                actual,
            });
        }

        let revision = expected_revision.saturating_add(1);
        progressions.insert(employee, progression.clone().with_revision(revision));
        Ok(revision)
    }

    async fn list(&self) -> ProgressionStoreResult<Vec<EmployeeProgression>> {
        let progressions = self.progressions.read().map_err(|err| lock_error(&err))?;
        let mut listed: Vec<EmployeeProgression> = progressions.values().cloned().collect();
        listed.sort_by_key(EmployeeProgression::employee);
        Ok(listed)
    }

    async fn replace(&self, replacements: Vec<EmployeeProgression>) -> ProgressionStoreResult<()> {
        let mut progressions = self.progressions.write().map_err(|err| lock_error(&err))?;
        // Bump past the old revision so writers holding pre-rebuild state conflict.
        let rebuilt: HashMap<EmployeeId, EmployeeProgression> = replacements
            .into_iter()
            .map(|progression| {
                let employee = progression.employee();
                let previous = progressions
                    .get(&employee)
                    .map_or(0, EmployeeProgression::revision);
                (employee, progression.with_revision(previous.saturating_add(1)))
            })
            .collect();
        *progressions = rebuilt;
        Ok(())
    }
}
