//! Recognition of task completions in the event stream.

use crate::task::domain::{
    AggregateId, EmployeeId, SkillName, TaskAggregate, TaskEvent, TaskEventPayload, TaskReward,
    Version,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task completion that earns the assignee XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Completed task aggregate.
    pub aggregate_id: AggregateId,
    /// Sequence of the completing event.
    pub sequence: Version,
    /// Employee credited.
    pub employee: EmployeeId,
    /// Skill credited.
    pub skill: SkillName,
    /// XP awarded.
    pub reward: TaskReward,
    /// When the completing event occurred.
    pub completed_at: DateTime<Utc>,
}

impl Completion {
    /// Returns the completion carried by `event`, if any.
    ///
    /// `task` is the aggregate state after `event`. A task without review
    /// completes on `Submitted`; the system approval that follows it is not
    /// a second completion. A reviewed task completes on `Approved`.
    #[must_use]
    pub fn detect(task: &TaskAggregate, event: &TaskEvent) -> Option<Self> {
        let assignment = task.assignment()?;
        let completes = match event.payload() {
            TaskEventPayload::Submitted => !assignment.requires_approval,
            TaskEventPayload::Approved { .. } => assignment.requires_approval,
            _ => false,
        };
        if !completes || event.aggregate_id() != task.id() {
            return None;
        }
        Some(Self {
            aggregate_id: event.aggregate_id(),
            sequence: event.sequence(),
            employee: assignment.assigned_to,
            skill: assignment.skill.clone(),
            reward: assignment.reward,
            completed_at: event.occurred_at(),
        })
    }
}
