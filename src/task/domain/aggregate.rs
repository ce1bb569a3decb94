//! Task aggregate rebuilt from its event history, and the lifecycle state
//! machine it enforces.

use super::{
    AggregateId, DepartmentName, EmployeeId, ParseTaskStatusError, SkillName, TaskDomainError,
    TaskEvent, TaskEventKind, TaskEventPayload, TaskId, TaskReward, Version,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No assignment has been recorded yet.
    Available,
    /// An employee holds the task.
    Assigned,
    /// The assignee submitted the work.
    Submitted,
    /// The work was accepted.
    Approved,
    /// The work was refused.
    Rejected,
    /// The task was withdrawn.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Assigned => "assigned",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for states that accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }

    /// Returns whether the state machine has an edge from `self` to `target`.
    ///
    /// Approval gating is not considered here; see [`TaskAggregate::apply`].
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Available, Self::Assigned | Self::Cancelled)
                | (Self::Assigned, Self::Submitted | Self::Cancelled)
                | (
                    Self::Submitted,
                    Self::Approved | Self::Rejected | Self::Cancelled
                )
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "available" => Ok(Self::Available),
            "assigned" => Ok(Self::Assigned),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Command names used when reporting illegal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCommandKind {
    /// Assign a task to an employee.
    Assign,
    /// Submit assigned work.
    Submit,
    /// Approve a submission.
    Approve,
    /// Reject a submission.
    Reject,
    /// Cancel the task.
    Cancel,
}

impl TaskCommandKind {
    /// Returns the command verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }

    const fn for_event(kind: TaskEventKind) -> Self {
        match kind {
            TaskEventKind::Assigned => Self::Assign,
            TaskEventKind::Submitted => Self::Submit,
            TaskEventKind::Approved => Self::Approve,
            TaskEventKind::Rejected => Self::Reject,
            TaskEventKind::Cancelled => Self::Cancel,
        }
    }

    const fn target(self) -> TaskStatus {
        match self {
            Self::Assign => TaskStatus::Assigned,
            Self::Submit => TaskStatus::Submitted,
            Self::Approve => TaskStatus::Approved,
            Self::Reject => TaskStatus::Rejected,
            Self::Cancel => TaskStatus::Cancelled,
        }
    }
}

impl fmt::Display for TaskCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields fixed when a task is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Catalog entry being worked on.
    pub task_id: TaskId,
    /// Employee holding the task.
    pub assigned_to: EmployeeId,
    /// Title supplied at assignment.
    pub title: String,
    /// Description supplied at assignment.
    pub description: String,
    /// Department used for grouping.
    pub department: DepartmentName,
    /// Skill credited on completion.
    pub skill: SkillName,
    /// Whether submission needs a separate approval.
    pub requires_approval: bool,
    /// XP credited on completion.
    pub reward: TaskReward,
}

impl Assignment {
    fn into_payload(self) -> TaskEventPayload {
        TaskEventPayload::Assigned {
            task_id: self.task_id,
            assigned_to: self.assigned_to,
            title: self.title,
            description: self.description,
            department: self.department,
            skill: self.skill,
            requires_approval: self.requires_approval,
            reward: self.reward,
        }
    }

    fn from_payload(payload: &TaskEventPayload) -> Option<Self> {
        let TaskEventPayload::Assigned {
            task_id,
            assigned_to,
            title,
            description,
            department,
            skill,
            requires_approval,
            reward,
        } = payload
        else {
            return None;
        };
        Some(Self {
            task_id: *task_id,
            assigned_to: *assigned_to,
            title: title.clone(),
            description: description.clone(),
            department: department.clone(),
            skill: skill.clone(),
            requires_approval: *requires_approval,
            reward: *reward,
        })
    }
}

/// Current state of one task assignment, derived from its events.
///
/// The aggregate owns no persistent state: it is rebuilt by folding the
/// event log and discarded after each command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskAggregate {
    id: AggregateId,
    assignment: Option<Assignment>,
    status: TaskStatus,
    version: Version,
    approved_by: Option<EmployeeId>,
    resolution_reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TaskAggregate {
    /// Returns the implicit `Available` state of a stream with no events.
    #[must_use]
    pub const fn empty(id: AggregateId) -> Self {
        Self {
            id,
            assignment: None,
            status: TaskStatus::Available,
            version: Version::INITIAL,
            approved_by: None,
            resolution_reason: None,
            created_at: None,
            submitted_at: None,
            completed_at: None,
            updated_at: None,
        }
    }

    /// Rebuilds an aggregate by folding `events` over the empty state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the history contains a foreign event,
    /// a sequence gap, or a transition the state machine forbids.
    pub fn replay<'a>(
        id: AggregateId,
        events: impl IntoIterator<Item = &'a TaskEvent>,
    ) -> Result<Self, TaskDomainError> {
        events
            .into_iter()
            .try_fold(Self::empty(id), |state, event| state.apply(event))
    }

    /// Applies one event and returns the resulting state.
    ///
    /// `self` is left untouched, so a rejected event leaves the caller's
    /// aggregate unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ForeignEvent`],
    /// [`TaskDomainError::SequenceGap`], or
    /// [`TaskDomainError::InvalidTransition`].
    pub fn apply(&self, event: &TaskEvent) -> Result<Self, TaskDomainError> {
        if event.aggregate_id() != self.id {
            return Err(TaskDomainError::ForeignEvent {
                expected: self.id,
                found: event.aggregate_id(),
            });
        }
        let expected = self.version.next();
        if event.sequence() != expected {
            return Err(TaskDomainError::SequenceGap {
                aggregate_id: self.id,
                expected,
                found: event.sequence(),
            });
        }

        let attempted = TaskCommandKind::for_event(event.kind());
        if !self.accepts(event.payload()) {
            return Err(self.invalid(attempted));
        }

        let mut next = self.clone();
        match event.payload() {
            TaskEventPayload::Assigned { .. } => {
                next.assignment = Assignment::from_payload(event.payload());
                next.created_at = Some(event.occurred_at());
            }
            TaskEventPayload::Submitted => next.submitted_at = Some(event.occurred_at()),
            TaskEventPayload::Approved { approved_by } => next.approved_by = *approved_by,
            TaskEventPayload::Rejected { reason, rejected_by } => {
                next.approved_by = *rejected_by;
                next.resolution_reason = Some(reason.clone());
            }
            TaskEventPayload::Cancelled { reason } => next.resolution_reason.clone_from(reason),
        }
        next.status = attempted.target();
        if next.status.is_terminal() {
            next.completed_at = Some(event.occurred_at());
        }
        next.version = event.sequence();
        next.updated_at = Some(event.occurred_at());
        Ok(next)
    }

    fn accepts(&self, payload: &TaskEventPayload) -> bool {
        let requires_approval = self.requires_approval();
        match payload {
            TaskEventPayload::Assigned { .. } => self.status == TaskStatus::Available,
            TaskEventPayload::Submitted => self.status == TaskStatus::Assigned,
            TaskEventPayload::Approved { approved_by } => {
                // Only the system approves tasks that skip review.
                self.status == TaskStatus::Submitted
                    && (requires_approval || approved_by.is_none())
            }
            TaskEventPayload::Rejected { .. } => {
                self.status == TaskStatus::Submitted && requires_approval
            }
            TaskEventPayload::Cancelled { .. } => !self.status.is_terminal(),
        }
    }

    /// Decides the `Assigned` event for an empty aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the aggregate is
    /// still `Available`.
    pub fn assign(
        &self,
        assignment: Assignment,
        clock: &impl Clock,
    ) -> Result<TaskEvent, TaskDomainError> {
        if self.status != TaskStatus::Available {
            return Err(self.invalid(TaskCommandKind::Assign));
        }
        Ok(self.emit(assignment.into_payload(), clock))
    }

    /// Decides the `Submitted` event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAssigned`] unless the task is `Assigned`.
    pub fn submit(&self, clock: &impl Clock) -> Result<TaskEvent, TaskDomainError> {
        if self.status != TaskStatus::Assigned {
            return Err(TaskDomainError::NotAssigned {
                aggregate_id: self.id,
                status: self.status,
            });
        }
        Ok(self.emit(TaskEventPayload::Submitted, clock))
    }

    /// Decides a reviewer's `Approved` event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSubmittedOrNoApprovalNeeded`] unless the
    /// task is `Submitted` and requires approval.
    pub fn approve(
        &self,
        approved_by: EmployeeId,
        clock: &impl Clock,
    ) -> Result<TaskEvent, TaskDomainError> {
        self.ensure_awaiting_review()?;
        Ok(self.emit(
            TaskEventPayload::Approved {
                approved_by: Some(approved_by),
            },
            clock,
        ))
    }

    /// Decides the system approval that closes a task without review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSubmittedOrNoApprovalNeeded`] unless the
    /// task is `Submitted` and does not require approval.
    pub fn auto_approve(&self, clock: &impl Clock) -> Result<TaskEvent, TaskDomainError> {
        if self.status != TaskStatus::Submitted || self.requires_approval() {
            return Err(self.not_awaiting_review());
        }
        Ok(self.emit(TaskEventPayload::Approved { approved_by: None }, clock))
    }

    /// Decides the `Rejected` event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSubmittedOrNoApprovalNeeded`] unless the
    /// task is `Submitted` and requires approval.
    pub fn reject(
        &self,
        reason: String,
        rejected_by: Option<EmployeeId>,
        clock: &impl Clock,
    ) -> Result<TaskEvent, TaskDomainError> {
        self.ensure_awaiting_review()?;
        Ok(self.emit(
            TaskEventPayload::Rejected {
                reason,
                rejected_by,
            },
            clock,
        ))
    }

    /// Decides the `Cancelled` event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyTerminal`] when the task is
    /// `Approved`, `Rejected`, or `Cancelled`.
    pub fn cancel(
        &self,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Result<TaskEvent, TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::AlreadyTerminal {
                aggregate_id: self.id,
                status: self.status,
            });
        }
        Ok(self.emit(TaskEventPayload::Cancelled { reason }, clock))
    }

    /// Returns the aggregate identifier.
    #[must_use]
    pub const fn id(&self) -> AggregateId {
        self.id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the sequence of the last applied event.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the assignment, once recorded.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Returns the assignee, once recorded.
    #[must_use]
    pub fn assigned_to(&self) -> Option<EmployeeId> {
        self.assignment.as_ref().map(|assignment| assignment.assigned_to)
    }

    /// Returns whether submissions need a separate approval.
    #[must_use]
    pub fn requires_approval(&self) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|assignment| assignment.requires_approval)
    }

    /// Returns the reviewer of the final decision, if any.
    #[must_use]
    pub const fn approved_by(&self) -> Option<EmployeeId> {
        self.approved_by
    }

    /// Returns the rejection or cancellation reason, if any.
    #[must_use]
    pub fn resolution_reason(&self) -> Option<&str> {
        self.resolution_reason.as_deref()
    }

    /// Returns when the task was assigned.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns when the work was submitted, if it was.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Returns when the task reached a terminal status.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns when the latest event occurred.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn emit(&self, payload: TaskEventPayload, clock: &impl Clock) -> TaskEvent {
        TaskEvent::new(self.id, self.version.next(), clock.utc(), payload)
    }

    fn ensure_awaiting_review(&self) -> Result<(), TaskDomainError> {
        if self.status == TaskStatus::Submitted && self.requires_approval() {
            Ok(())
        } else {
            Err(self.not_awaiting_review())
        }
    }

    const fn not_awaiting_review(&self) -> TaskDomainError {
        TaskDomainError::NotSubmittedOrNoApprovalNeeded {
            aggregate_id: self.id,
            status: self.status,
        }
    }

    const fn invalid(&self, attempted: TaskCommandKind) -> TaskDomainError {
        TaskDomainError::InvalidTransition {
            aggregate_id: self.id,
            from: self.status,
            attempted,
        }
    }
}
