//! Read-side queries over the catalog and the task event stream.

use super::error::{TaskLifecycleError, TaskLifecycleResult};
use crate::task::{
    domain::{
        AggregateId, CatalogTask, DepartmentName, EmployeeId, EmployeeTaskView, SkillName,
        TaskBoard, TaskEvent, TaskId, TaskReward, TaskValidationError,
    },
    ports::{TaskCatalog, TaskEventStore},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Offset pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// Number of items to skip.
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_limit() -> usize {
    100
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    /// Creates validated pagination parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::InvalidLimit`] when `limit` is zero or
    /// above [`MAX_PAGE_SIZE`].
    pub fn new(skip: usize, limit: usize) -> Result<Self, TaskValidationError> {
        let pagination = Self { skip, limit };
        pagination.validate()?;
        Ok(pagination)
    }

    /// Checks the limit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::InvalidLimit`] when out of range.
    pub const fn validate(&self) -> Result<(), TaskValidationError> {
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(TaskValidationError::InvalidLimit {
                max: MAX_PAGE_SIZE,
                actual: self.limit,
            });
        }
        Ok(())
    }

    fn slice<T>(self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}

/// Filter for the available-tasks listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvailableTasksQuery {
    /// Page window.
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Selects active entries when `true` and retired entries when `false`.
    #[serde(default = "default_only_active")]
    pub only_active: bool,
    /// Restricts results to one department.
    #[serde(default)]
    pub department: Option<DepartmentName>,
}

const fn default_only_active() -> bool {
    true
}

impl Default for AvailableTasksQuery {
    fn default() -> Self {
        Self {
            pagination: Pagination::default(),
            only_active: default_only_active(),
            department: None,
        }
    }
}

/// One page of results with the unpaginated total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items in the requested window.
    pub items: Vec<T>,
    /// Number of matching items before pagination.
    pub count: usize,
}

impl Page<AvailableTaskView> {
    /// Groups the page's items by department name.
    #[must_use]
    pub fn group_by_department(&self) -> BTreeMap<String, Vec<AvailableTaskView>> {
        let mut groups: BTreeMap<String, Vec<AvailableTaskView>> = BTreeMap::new();
        for item in &self.items {
            groups
                .entry(item.department_name.as_str().to_owned())
                .or_default()
                .push(item.clone());
        }
        groups
    }
}

/// Catalog entry that can be assigned right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableTaskView {
    /// Catalog identifier.
    pub task_id: TaskId,
    /// Catalog title.
    pub title: String,
    /// Catalog description.
    pub description: String,
    /// Owning department.
    pub department_name: DepartmentName,
    /// Skill credited on completion.
    pub skill: SkillName,
    /// Default approval requirement.
    pub requires_approval: bool,
    /// XP credited on completion.
    pub reward: TaskReward,
    /// Whether the entry can still be assigned.
    pub is_active: bool,
}

impl From<CatalogTask> for AvailableTaskView {
    fn from(task: CatalogTask) -> Self {
        Self {
            task_id: task.id(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            department_name: task.department().clone(),
            skill: task.skill().clone(),
            requires_approval: task.requires_approval(),
            reward: task.reward(),
            is_active: task.is_active(),
        }
    }
}

/// Read-model queries derived from the catalog and the event stream.
///
/// Every call folds the stream afresh; nothing is cached between calls.
#[derive(Clone)]
pub struct TaskQueryService<S, K>
where
    S: TaskEventStore,
    K: TaskCatalog,
{
    store: Arc<S>,
    catalog: Arc<K>,
}

impl<S, K> TaskQueryService<S, K>
where
    S: TaskEventStore,
    K: TaskCatalog,
{
    /// Creates a new query service.
    #[must_use]
    pub const fn new(store: Arc<S>, catalog: Arc<K>) -> Self {
        Self { store, catalog }
    }

    /// Lists catalog entries with no active assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for bad pagination, or an
    /// infrastructure error when the catalog or store fails.
    pub async fn available_tasks(
        &self,
        query: &AvailableTasksQuery,
    ) -> TaskLifecycleResult<Page<AvailableTaskView>> {
        query.pagination.validate()?;
        let claimed = self.board().await?.claimed_tasks();
        let matching: Vec<AvailableTaskView> = self
            .catalog
            .list()
            .await?
            .into_iter()
            .filter(|task| task.is_active() == query.only_active)
            .filter(|task| {
                query
                    .department
                    .as_ref()
                    .is_none_or(|department| task.department() == department)
            })
            .filter(|task| !claimed.contains(&task.id()))
            .map(AvailableTaskView::from)
            .collect();

        let count = matching.len();
        debug!(count, claimed = claimed.len(), "listed available tasks");
        Ok(Page {
            items: query.pagination.slice(matching),
            count,
        })
    }

    /// Lists an employee's assignments, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for bad pagination, or an
    /// infrastructure error when the store fails.
    pub async fn employee_tasks(
        &self,
        employee: EmployeeId,
        pagination: Pagination,
    ) -> TaskLifecycleResult<Page<EmployeeTaskView>> {
        pagination.validate()?;
        let views = self.board().await?.tasks_for(employee);
        let count = views.len();
        Ok(Page {
            items: pagination.slice(views),
            count,
        })
    }

    /// Returns the ordered event history of one aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AggregateNotFound`] when no events exist.
    pub async fn task_history(
        &self,
        aggregate_id: AggregateId,
    ) -> TaskLifecycleResult<Vec<TaskEvent>> {
        let events = self.store.read_all(aggregate_id).await?;
        if events.is_empty() {
            return Err(TaskLifecycleError::AggregateNotFound(aggregate_id));
        }
        Ok(events)
    }

    /// Folds the whole event stream into a [`TaskBoard`].
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the store fails, or
    /// [`TaskLifecycleError::Domain`] when a stream is inconsistent.
    pub async fn board(&self) -> TaskLifecycleResult<TaskBoard> {
        let events = self.store.read_stream().await?;
        Ok(TaskBoard::from_events(&events)?)
    }
}
