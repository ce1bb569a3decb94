//! Shared world state for task workflow BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskquest::progression::{
    adapters::memory::InMemoryProgressionStore, domain::ProgressionConfig,
    services::ProgressionProjector,
};
use taskquest::task::{
    adapters::memory::{InMemoryTaskCatalog, InMemoryTaskEventStore},
    domain::{AggregateId, EmployeeId, TaskId},
    services::{TaskLifecycleError, TaskLifecycleService},
};

/// Service type used by the BDD world.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskEventStore, InMemoryTaskCatalog, DefaultClock>;

/// Scenario world for task workflow behaviour tests.
pub struct TaskWorkflowWorld {
    pub catalog: Arc<InMemoryTaskCatalog>,
    pub service: TestTaskService,
    pub projector: ProgressionProjector<InMemoryProgressionStore>,
    pub employee: EmployeeId,
    pub catalog_task: Option<TaskId>,
    pub aggregate_id: Option<AggregateId>,
    pub last_result: Option<Result<(), TaskLifecycleError>>,
}

impl TaskWorkflowWorld {
    /// Creates a world with the projector observing the lifecycle service.
    #[must_use]
    pub fn new() -> Self {
        let catalog = Arc::new(InMemoryTaskCatalog::new());
        let projector = ProgressionProjector::new(
            Arc::new(InMemoryProgressionStore::new()),
            Arc::new(ProgressionConfig::default()),
        );
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskEventStore::new()),
            Arc::clone(&catalog),
            Arc::new(DefaultClock),
        )
        .with_observer(Arc::new(projector.clone()));

        Self {
            catalog,
            service,
            projector,
            employee: EmployeeId::new(),
            catalog_task: None,
            aggregate_id: None,
            last_result: None,
        }
    }

    /// Returns the aggregate created by the assignment step.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been assigned yet.
    pub fn aggregate(&self) -> Result<AggregateId, eyre::Report> {
        self.aggregate_id
            .ok_or_else(|| eyre::eyre!("missing assigned task in scenario world"))
    }

    /// Returns the catalog entry created by the catalog step.
    ///
    /// # Errors
    ///
    /// Returns an error when no catalog task has been created yet.
    pub fn catalog_task(&self) -> Result<TaskId, eyre::Report> {
        self.catalog_task
            .ok_or_else(|| eyre::eyre!("missing catalog task in scenario world"))
    }
}

impl Default for TaskWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
