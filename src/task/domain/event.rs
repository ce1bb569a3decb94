//! Immutable task events; the event log is the source of truth.

use super::{AggregateId, DepartmentName, EmployeeId, SkillName, TaskId, TaskReward, Version};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`TaskEventPayload`], also used for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    /// The task was assigned to an employee.
    Assigned,
    /// The assignee submitted the work.
    Submitted,
    /// The submission was approved, by a reviewer or automatically.
    Approved,
    /// A reviewer rejected the submission.
    Rejected,
    /// The task was cancelled.
    Cancelled,
}

impl TaskEventKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when the event ends the aggregate's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for TaskEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEventPayload {
    /// The task was assigned; fixes every descriptive field of the aggregate.
    Assigned {
        /// Catalog entry the assignment instantiates.
        task_id: TaskId,
        /// Employee holding the task.
        assigned_to: EmployeeId,
        /// Title supplied at assignment.
        title: String,
        /// Description supplied at assignment.
        description: String,
        /// Department snapshot from the catalog.
        department: DepartmentName,
        /// Skill snapshot from the catalog.
        skill: SkillName,
        /// Whether submission needs a separate approval.
        requires_approval: bool,
        /// Reward snapshot from the catalog.
        reward: TaskReward,
    },
    /// The assignee submitted the work.
    Submitted,
    /// The submission was approved.
    Approved {
        /// Reviewer, or `None` when the system approved automatically.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        approved_by: Option<EmployeeId>,
    },
    /// The submission was rejected.
    Rejected {
        /// Reason shown to the assignee.
        reason: String,
        /// Reviewer, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rejected_by: Option<EmployeeId>,
    },
    /// The task was cancelled.
    Cancelled {
        /// Optional cancellation reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl TaskEventPayload {
    /// Returns the payload discriminant.
    #[must_use]
    pub const fn kind(&self) -> TaskEventKind {
        match self {
            Self::Assigned { .. } => TaskEventKind::Assigned,
            Self::Submitted => TaskEventKind::Submitted,
            Self::Approved { .. } => TaskEventKind::Approved,
            Self::Rejected { .. } => TaskEventKind::Rejected,
            Self::Cancelled { .. } => TaskEventKind::Cancelled,
        }
    }
}

/// One recorded state transition of a task aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    aggregate_id: AggregateId,
    sequence: Version,
    occurred_at: DateTime<Utc>,
    payload: TaskEventPayload,
}

impl TaskEvent {
    /// Creates an event. Sequence numbers are assigned by the aggregate that
    /// decided the transition.
    #[must_use]
    pub const fn new(
        aggregate_id: AggregateId,
        sequence: Version,
        occurred_at: DateTime<Utc>,
        payload: TaskEventPayload,
    ) -> Self {
        Self {
            aggregate_id,
            sequence,
            occurred_at,
            payload,
        }
    }

    /// Returns the aggregate the event belongs to.
    #[must_use]
    pub const fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    /// Returns the per-aggregate sequence number.
    #[must_use]
    pub const fn sequence(&self) -> Version {
        self.sequence
    }

    /// Returns when the transition was decided.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the kind-specific data.
    #[must_use]
    pub const fn payload(&self) -> &TaskEventPayload {
        &self.payload
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> TaskEventKind {
        self.payload.kind()
    }

    /// Returns the catalog task claimed by an `Assigned` event.
    #[must_use]
    pub const fn claimed_task(&self) -> Option<TaskId> {
        match &self.payload {
            TaskEventPayload::Assigned { task_id, .. } => Some(*task_id),
            _ => None,
        }
    }
}
