//! Catalog port for looking up assignable task definitions.

use crate::task::domain::{CatalogTask, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Storage of assignable task definitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCatalog: Send + Sync {
    /// Finds a catalog entry by identifier.
    ///
    /// Returns `None` when the entry does not exist.
    async fn find(&self, id: TaskId) -> CatalogResult<Option<CatalogTask>>;

    /// Returns every catalog entry, active or not, ordered by title.
    async fn list(&self) -> CatalogResult<Vec<CatalogTask>>;

    /// Publishes a new catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateTask`] when the identifier is taken,
    /// or [`CatalogError::Persistence`] on storage failure.
    async fn add(&self, task: &CatalogTask) -> CatalogResult<()>;
}

/// Errors returned by catalog implementations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// A catalog entry with the same identifier already exists.
    #[error("duplicate catalog task: {0}")]
    DuplicateTask(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
