//! Query-side projection of task streams.
//!
//! A [`TaskBoard`] is derived entirely from the event stream and is never
//! written back; discard and rebuild it whenever in doubt.

use super::{
    AggregateId, DepartmentName, EmployeeId, TaskAggregate, TaskDomainError, TaskEvent, TaskId,
    TaskStatus, Version,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Denormalised summary of one task assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTaskView {
    /// Aggregate identifier.
    pub aggregate_id: AggregateId,
    /// Catalog entry the assignment instantiates.
    pub task_id: TaskId,
    /// Assignee.
    pub assigned_to: EmployeeId,
    /// Title at assignment.
    pub title: String,
    /// Description at assignment.
    pub description: String,
    /// Department at assignment.
    pub department: DepartmentName,
    /// Whether a separate approval is needed.
    pub requires_approval: bool,
    /// Current status.
    pub status: TaskStatus,
    /// Current version.
    pub version: Version,
    /// Reviewer of the final decision; `None` for system approvals.
    pub approved_by: Option<EmployeeId>,
    /// Rejection or cancellation reason.
    pub resolution_reason: Option<String>,
    /// Assignment time.
    pub created_at: DateTime<Utc>,
    /// Submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Time the task reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
    /// Time of the latest event.
    pub updated_at: DateTime<Utc>,
}

impl EmployeeTaskView {
    fn from_aggregate(aggregate: &TaskAggregate) -> Option<Self> {
        let assignment = aggregate.assignment()?;
        Some(Self {
            aggregate_id: aggregate.id(),
            task_id: assignment.task_id,
            assigned_to: assignment.assigned_to,
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            department: assignment.department.clone(),
            requires_approval: assignment.requires_approval,
            status: aggregate.status(),
            version: aggregate.version(),
            approved_by: aggregate.approved_by(),
            resolution_reason: aggregate.resolution_reason().map(str::to_owned),
            created_at: aggregate.created_at()?,
            submitted_at: aggregate.submitted_at(),
            completed_at: aggregate.completed_at(),
            updated_at: aggregate.updated_at()?,
        })
    }
}

/// In-memory fold of every task stream.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    aggregates: HashMap<AggregateId, TaskAggregate>,
}

impl TaskBoard {
    /// Builds a board from events in commit order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when a stream is inconsistent.
    pub fn from_events<'a>(
        events: impl IntoIterator<Item = &'a TaskEvent>,
    ) -> Result<Self, TaskDomainError> {
        let mut board = Self::default();
        for event in events {
            board.apply(event)?;
        }
        Ok(board)
    }

    /// Folds one event into its aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the event does not follow its stream.
    pub fn apply(&mut self, event: &TaskEvent) -> Result<(), TaskDomainError> {
        let id = event.aggregate_id();
        let next = self
            .aggregates
            .get(&id)
            .map_or_else(|| TaskAggregate::empty(id), Clone::clone)
            .apply(event)?;
        self.aggregates.insert(id, next);
        Ok(())
    }

    /// Returns catalog task ids currently held by a non-terminal assignment.
    #[must_use]
    pub fn claimed_tasks(&self) -> HashSet<TaskId> {
        self.aggregates
            .values()
            .filter(|aggregate| !aggregate.status().is_terminal())
            .filter_map(|aggregate| aggregate.assignment().map(|assignment| assignment.task_id))
            .collect()
    }

    /// Returns every assignment of `employee`, newest first.
    #[must_use]
    pub fn tasks_for(&self, employee: EmployeeId) -> Vec<EmployeeTaskView> {
        let mut views: Vec<EmployeeTaskView> = self
            .aggregates
            .values()
            .filter(|aggregate| aggregate.assigned_to() == Some(employee))
            .filter_map(EmployeeTaskView::from_aggregate)
            .collect();
        views.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.aggregate_id.cmp(&right.aggregate_id))
        });
        views
    }

    /// Returns the aggregate for `id`, if any event was recorded.
    #[must_use]
    pub fn aggregate(&self, id: AggregateId) -> Option<&TaskAggregate> {
        self.aggregates.get(&id)
    }

    /// Returns the number of known aggregates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    /// Returns `true` when no events were folded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}
