//! In-memory task catalog.

use crate::task::{
    domain::{CatalogTask, TaskId},
    ports::{CatalogError, CatalogResult, TaskCatalog},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory implementation of [`TaskCatalog`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskCatalog {
    tasks: Arc<RwLock<HashMap<TaskId, CatalogTask>>>,
}

impl InMemoryTaskCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateTask`] when the identifier is taken.
    pub fn insert(&self, task: CatalogTask) -> CatalogResult<()> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|err| CatalogError::persistence(std::io::Error::other(err.to_string())))?;
        if tasks.contains_key(&task.id()) {
            return Err(CatalogError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task);
        Ok(())
    }
}

#[async_trait]
impl TaskCatalog for InMemoryTaskCatalog {
    async fn find(&self, id: TaskId) -> CatalogResult<Option<CatalogTask>> {
        let tasks = self
            .tasks
            .read()
            .map_err(|err| CatalogError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(tasks.get(&id).cloned())
    }

    async fn list(&self) -> CatalogResult<Vec<CatalogTask>> {
        let tasks = self
            .tasks
            .read()
            .map_err(|err| CatalogError::persistence(std::io::Error::other(err.to_string())))?;
        let mut listed: Vec<CatalogTask> = tasks.values().cloned().collect();
        listed.sort_by(|left, right| {
            left.title()
                .cmp(right.title())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(listed)
    }

    async fn add(&self, task: &CatalogTask) -> CatalogResult<()> {
        self.insert(task.clone())
    }
}
