//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskquest::progression::{
    adapters::memory::InMemoryProgressionStore, domain::ProgressionConfig,
    services::ProgressionProjector,
};
use taskquest::task::{
    adapters::memory::{InMemoryTaskCatalog, InMemoryTaskEventStore},
    domain::{CatalogTask, DepartmentName, SkillName, TaskId, TaskReward},
    services::{TaskLifecycleService, TaskQueryService},
};

/// Lifecycle service over the in-memory adapters.
pub type MemoryLifecycle =
    TaskLifecycleService<InMemoryTaskEventStore, InMemoryTaskCatalog, DefaultClock>;

/// Every service wired against shared in-memory stores.
pub struct App {
    pub events: Arc<InMemoryTaskEventStore>,
    pub catalog: Arc<InMemoryTaskCatalog>,
    pub lifecycle: MemoryLifecycle,
    pub queries: TaskQueryService<InMemoryTaskEventStore, InMemoryTaskCatalog>,
    pub projector: ProgressionProjector<InMemoryProgressionStore>,
}

impl App {
    /// Adds an active catalog entry and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when the labels are invalid or the id is taken.
    pub fn offer(
        &self,
        title: &str,
        department: &str,
        skill: &str,
        reward: TaskReward,
        requires_approval: bool,
    ) -> Result<TaskId, eyre::Report> {
        let entry = CatalogTask::new(title, DepartmentName::new(department)?, SkillName::new(skill)?)?
            .with_reward(reward)
            .with_requires_approval(requires_approval);
        let id = entry.id();
        self.catalog.insert(entry)?;
        Ok(id)
    }
}

/// Fixture wiring the projector as a lifecycle observer.
#[fixture]
pub fn app() -> App {
    let events = Arc::new(InMemoryTaskEventStore::new());
    let catalog = Arc::new(InMemoryTaskCatalog::new());
    let projector = ProgressionProjector::new(
        Arc::new(InMemoryProgressionStore::new()),
        Arc::new(ProgressionConfig::default()),
    );
    let lifecycle = TaskLifecycleService::new(
        Arc::clone(&events),
        Arc::clone(&catalog),
        Arc::new(DefaultClock),
    )
    .with_observer(Arc::new(projector.clone()));
    let queries = TaskQueryService::new(Arc::clone(&events), Arc::clone(&catalog));
    App {
        events,
        catalog,
        lifecycle,
        queries,
        projector,
    }
}
