//! Command handlers for the task lifecycle.

use super::error::{TaskLifecycleError, TaskLifecycleResult};
use crate::task::{
    domain::{
        AggregateId, Assignment, EmployeeId, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH, TaskAggregate,
        TaskDomainError, TaskEvent, TaskEventKind, TaskId, TaskStatus, TaskValidationError,
        bounded_text, required_text,
    },
    ports::{TaskCatalog, TaskEventObserver, TaskEventStore},
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for assigning a catalog task to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignTaskRequest {
    task_id: TaskId,
    assigned_to_id: EmployeeId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    requires_approval: bool,
}

impl AssignTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(task_id: TaskId, assigned_to_id: EmployeeId, title: impl Into<String>) -> Self {
        Self {
            task_id,
            assigned_to_id,
            title: title.into(),
            description: String::new(),
            requires_approval: false,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets whether submissions need a separate approval.
    #[must_use]
    pub const fn with_requires_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = requires_approval;
        self
    }
}

/// Request payload for submitting assigned work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubmitTaskRequest {
    aggregate_id: AggregateId,
}

impl SubmitTaskRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(aggregate_id: AggregateId) -> Self {
        Self { aggregate_id }
    }
}

/// Request payload for a reviewer approving a submission.
///
/// The reviewer is mandatory: an approval without one is reserved for the
/// system closing tasks that skip review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ApproveTaskRequest {
    aggregate_id: AggregateId,
    approved_by_id: EmployeeId,
}

impl ApproveTaskRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(aggregate_id: AggregateId, approved_by_id: EmployeeId) -> Self {
        Self {
            aggregate_id,
            approved_by_id,
        }
    }
}

/// Request payload for rejecting a submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RejectTaskRequest {
    aggregate_id: AggregateId,
    reason: String,
    #[serde(default)]
    rejected_by_id: Option<EmployeeId>,
}

impl RejectTaskRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(aggregate_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            aggregate_id,
            reason: reason.into(),
            rejected_by_id: None,
        }
    }

    /// Records the reviewer.
    #[must_use]
    pub const fn rejected_by(mut self, reviewer: EmployeeId) -> Self {
        self.rejected_by_id = Some(reviewer);
        self
    }
}

/// Request payload for cancelling a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelTaskRequest {
    aggregate_id: AggregateId,
    #[serde(default)]
    reason: Option<String>,
}

impl CancelTaskRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id,
            reason: None,
        }
    }

    /// Sets the cancellation reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Retry behaviour for commands that lose an optimistic concurrency race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPolicy {
    /// Reload-and-retry attempts after a `Conflict` before surfacing it.
    pub conflict_retries: u32,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self {
            conflict_retries: 3,
        }
    }
}

impl CommandPolicy {
    /// Surfaces the first lost race to the caller.
    #[must_use]
    pub const fn no_retries() -> Self {
        Self {
            conflict_retries: 0,
        }
    }
}

/// Task lifecycle command handler.
///
/// Every command replays the aggregate from the event store, decides at most
/// one event and appends it with the version read at load time.
#[derive(Clone)]
pub struct TaskLifecycleService<S, K, C>
where
    S: TaskEventStore,
    K: TaskCatalog,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    catalog: Arc<K>,
    clock: Arc<C>,
    observers: Vec<Arc<dyn TaskEventObserver>>,
    policy: CommandPolicy,
}

impl<S, K, C> TaskLifecycleService<S, K, C>
where
    S: TaskEventStore,
    K: TaskCatalog,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with the default policy.
    #[must_use]
    pub fn new(store: Arc<S>, catalog: Arc<K>, clock: Arc<C>) -> Self {
        Self {
            store,
            catalog,
            clock,
            observers: Vec::new(),
            policy: CommandPolicy::default(),
        }
    }

    /// Registers a projection notified after every successful append.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TaskEventObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replaces the concurrency retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CommandPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Assigns a catalog task and returns the new aggregate identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for malformed fields,
    /// [`TaskLifecycleError::CatalogTaskNotFound`] or
    /// [`TaskLifecycleError::CatalogTaskInactive`] for unusable catalog
    /// entries, and [`TaskLifecycleError::AlreadyAssigned`] when an active
    /// aggregate already holds the task.
    pub async fn assign_task(&self, request: AssignTaskRequest) -> TaskLifecycleResult<AggregateId> {
        let title = required_text("title", &request.title, MAX_TITLE_LENGTH)?;
        let description = bounded_text("description", request.description.trim(), MAX_TEXT_LENGTH)?;

        let entry = self
            .catalog
            .find(request.task_id)
            .await?
            .ok_or(TaskLifecycleError::CatalogTaskNotFound(request.task_id))?;
        if !entry.is_active() {
            return Err(TaskLifecycleError::CatalogTaskInactive(request.task_id));
        }
        if let Some(holder) = self.store.active_aggregate_for(request.task_id).await? {
            return Err(TaskLifecycleError::AlreadyAssigned {
                task_id: request.task_id,
                holder,
            });
        }

        let assignment = Assignment {
            task_id: request.task_id,
            assigned_to: request.assigned_to_id,
            title,
            description,
            department: entry.department().clone(),
            skill: entry.skill().clone(),
            requires_approval: request.requires_approval,
            reward: entry.reward(),
        };
        let aggregate = TaskAggregate::empty(AggregateId::new());
        let event = aggregate.assign(assignment, &*self.clock)?;
        self.commit(&aggregate, event).await?;

        info!(
            aggregate_id = %aggregate.id(),
            task_id = %request.task_id,
            employee_id = %request.assigned_to_id,
            "task assigned"
        );
        Ok(aggregate.id())
    }

    /// Submits assigned work and returns the `Submitted` event.
    ///
    /// Tasks that need no approval are then closed by a system approval
    /// event; failing to append it never fails the submission. Submitting
    /// such a task again while it is still `Submitted` retries that system
    /// approval and returns the `Approved` event instead.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AggregateNotFound`],
    /// [`TaskDomainError::NotAssigned`] wrapped in
    /// [`TaskLifecycleError::Domain`], or [`TaskLifecycleError::Conflict`].
    pub async fn submit_task(&self, request: SubmitTaskRequest) -> TaskLifecycleResult<TaskEvent> {
        let (task, event) = self
            .execute(request.aggregate_id, |aggregate, clock| {
                if aggregate.status() == TaskStatus::Submitted && !aggregate.requires_approval() {
                    aggregate.auto_approve(clock)
                } else {
                    aggregate.submit(clock)
                }
            })
            .await?;

        if event.kind() != TaskEventKind::Submitted {
            info!(
                aggregate_id = %task.id(),
                version = %task.version(),
                "pending auto-approval completed on resubmission"
            );
            return Ok(event);
        }
        info!(aggregate_id = %task.id(), version = %task.version(), "task submitted");

        if !task.requires_approval() {
            self.auto_approve(task.id()).await;
        }
        Ok(event)
    }

    /// Approves a submission and returns the `Approved` event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotSubmittedOrNoApprovalNeeded`] wrapped in
    /// [`TaskLifecycleError::Domain`] unless the task awaits review.
    pub async fn approve_task(
        &self,
        request: ApproveTaskRequest,
    ) -> TaskLifecycleResult<TaskEvent> {
        let reviewer = request.approved_by_id;
        let (task, event) = self
            .execute(request.aggregate_id, move |aggregate, clock| {
                aggregate.approve(reviewer, clock)
            })
            .await?;
        info!(aggregate_id = %task.id(), version = %task.version(), "task approved");
        Ok(event)
    }

    /// Rejects a submission and returns the `Rejected` event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for an empty reason, or
    /// [`TaskDomainError::NotSubmittedOrNoApprovalNeeded`] wrapped in
    /// [`TaskLifecycleError::Domain`] unless the task awaits review.
    pub async fn reject_task(&self, request: RejectTaskRequest) -> TaskLifecycleResult<TaskEvent> {
        let reason = required_text("reason", &request.reason, MAX_TEXT_LENGTH)?;
        let reviewer = request.rejected_by_id;
        let (task, event) = self
            .execute(request.aggregate_id, move |aggregate, clock| {
                aggregate.reject(reason.clone(), reviewer, clock)
            })
            .await?;
        info!(aggregate_id = %task.id(), version = %task.version(), "task rejected");
        Ok(event)
    }

    /// Cancels a task and returns the `Cancelled` event.
    ///
    /// Only assigned aggregates can be addressed: a task that is still
    /// `Available` has no event stream, so cancelling an unknown aggregate
    /// returns [`TaskLifecycleError::AggregateNotFound`] rather than recording
    /// a cancellation. [`TaskAggregate::cancel`] accepts `Available` for
    /// callers folding streams directly.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AggregateNotFound`] for unknown
    /// aggregates, or [`TaskDomainError::AlreadyTerminal`] wrapped in
    /// [`TaskLifecycleError::Domain`] for finished tasks.
    pub async fn cancel_task(&self, request: CancelTaskRequest) -> TaskLifecycleResult<TaskEvent> {
        let reason = optional_reason(request.reason.as_deref())?;
        let (task, event) = self
            .execute(request.aggregate_id, move |aggregate, clock| {
                aggregate.cancel(reason.clone(), clock)
            })
            .await?;
        info!(aggregate_id = %task.id(), version = %task.version(), "task cancelled");
        Ok(event)
    }

    /// Rebuilds the current state of an aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AggregateNotFound`] when the aggregate
    /// has no events.
    pub async fn load_task(&self, aggregate_id: AggregateId) -> TaskLifecycleResult<TaskAggregate> {
        let events = self.store.read_all(aggregate_id).await?;
        if events.is_empty() {
            return Err(TaskLifecycleError::AggregateNotFound(aggregate_id));
        }
        Ok(TaskAggregate::replay(aggregate_id, &events)?)
    }

    async fn execute<D>(
        &self,
        aggregate_id: AggregateId,
        decide: D,
    ) -> TaskLifecycleResult<(TaskAggregate, TaskEvent)>
    where
        D: Fn(&TaskAggregate, &C) -> Result<TaskEvent, TaskDomainError> + Send + Sync,
    {
        let mut retries_left = self.policy.conflict_retries;
        loop {
            let aggregate = self.load_task(aggregate_id).await?;
            let event = decide(&aggregate, &*self.clock)?;
            match self.commit(&aggregate, event).await {
                Err(TaskLifecycleError::Conflict { expected, actual, .. }) if retries_left > 0 => {
                    retries_left -= 1;
                    debug!(
                        aggregate_id = %aggregate_id,
                        expected = %expected,
                        actual = %actual,
                        retries_left,
                        "lost append race, reloading"
                    );
                }
                result => return result,
            }
        }
    }

    async fn commit(
        &self,
        aggregate: &TaskAggregate,
        event: TaskEvent,
    ) -> TaskLifecycleResult<(TaskAggregate, TaskEvent)> {
        let next = aggregate.apply(&event)?;
        self.store.append(aggregate.version(), &event).await?;
        self.notify(&next, &event).await;
        Ok((next, event))
    }

    async fn notify(&self, task: &TaskAggregate, event: &TaskEvent) {
        for observer in &self.observers {
            if let Err(err) = observer.on_event(task, event).await {
                warn!(
                    aggregate_id = %event.aggregate_id(),
                    sequence = %event.sequence(),
                    observer = err.observer,
                    error = %err,
                    "task event observer failed; replay the log to catch up"
                );
            }
        }
    }

    async fn auto_approve(&self, aggregate_id: AggregateId) {
        match self
            .execute(aggregate_id, |aggregate, clock| aggregate.auto_approve(clock))
            .await
        {
            Ok((task, _)) => {
                info!(aggregate_id = %task.id(), version = %task.version(), "task auto-approved");
            }
            Err(err) => warn!(
                aggregate_id = %aggregate_id,
                error = %err,
                "auto-approval skipped"
            ),
        }
    }
}

fn optional_reason(reason: Option<&str>) -> Result<Option<String>, TaskValidationError> {
    reason
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(|trimmed| bounded_text("reason", trimmed, MAX_TEXT_LENGTH))
        .transpose()
}
