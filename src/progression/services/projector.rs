//! Projection of task completions into employee XP.

use super::error::{ProgressionError, ProgressionResult};
use crate::progression::{
    domain::{
        Completion, CreditOutcome, EmployeeProgression, ProgressionConfig, ProgressionSummary,
        XpMultiplier,
    },
    ports::{ProgressionStore, ProgressionStoreError},
};
use crate::task::{
    domain::{EmployeeId, TaskAggregate, TaskBoard, TaskEvent},
    ports::{ObserverError, TaskEventObserver},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Retry behaviour for revision conflicts on progression saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectorPolicy {
    /// Reload-and-retry attempts after a revision conflict.
    pub conflict_retries: u32,
}

impl Default for ProjectorPolicy {
    fn default() -> Self {
        Self {
            conflict_retries: 3,
        }
    }
}

/// Credits XP for task completions and serves progression summaries.
///
/// Register it on a task lifecycle service with
/// `with_observer` for incremental updates, or feed it the full event log
/// through [`ProgressionProjector::rebuild`].
#[derive(Clone)]
pub struct ProgressionProjector<P>
where
    P: ProgressionStore,
{
    store: Arc<P>,
    config: Arc<ProgressionConfig>,
    policy: ProjectorPolicy,
}

impl<P> ProgressionProjector<P>
where
    P: ProgressionStore,
{
    /// Creates a projector with the default retry policy.
    #[must_use]
    pub fn new(store: Arc<P>, config: Arc<ProgressionConfig>) -> Self {
        Self {
            store,
            config,
            policy: ProjectorPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ProjectorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Credits the completion carried by `event`, if any.
    ///
    /// `task` is the aggregate state after `event`. Returns `None` for events
    /// that complete nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::Contended`] when every save lost a revision
    /// race, or [`ProgressionError::Store`] on store failure.
    pub async fn project(
        &self,
        task: &TaskAggregate,
        event: &TaskEvent,
    ) -> ProgressionResult<Option<CreditOutcome>> {
        let Some(completion) = Completion::detect(task, event) else {
            return Ok(None);
        };
        self.credit(&completion).await.map(Some)
    }

    async fn credit(&self, completion: &Completion) -> ProgressionResult<CreditOutcome> {
        let employee = completion.employee;
        let mut attempts = 0_u32;
        loop {
            attempts = attempts.saturating_add(1);
            let mut progression = self
                .store
                .load(employee)
                .await?
                .unwrap_or_else(|| EmployeeProgression::new(employee));
            let levels = &self.config.level_thresholds;
            let xp_before = progression.total_xp();
            let level_before = levels.level_for_xp(xp_before);

            if progression.credit(completion) == CreditOutcome::AlreadyApplied {
                debug!(
                    employee_id = %employee,
                    aggregate_id = %completion.aggregate_id,
                    sequence = %completion.sequence,
                    "completion already credited"
                );
                return Ok(CreditOutcome::AlreadyApplied);
            }

            match self.store.save(&progression, progression.revision()).await {
                Ok(revision) => {
                    let level = levels.level_for_xp(progression.total_xp());
                    info!(
                        employee_id = %employee,
                        aggregate_id = %completion.aggregate_id,
                        person_xp = completion.reward.person_xp,
                        earned_xp = progression.total_xp().saturating_sub(xp_before),
                        skill = %completion.skill,
                        total_xp = progression.total_xp(),
                        level,
                        revision,
                        "completion credited"
                    );
                    if level > level_before {
                        info!(employee_id = %employee, level, "employee levelled up");
                    }
                    return Ok(CreditOutcome::Applied);
                }
                Err(ProgressionStoreError::Conflict { .. })
                    if attempts <= self.policy.conflict_retries =>
                {
                    debug!(employee_id = %employee, attempts, "progression save raced, reloading");
                }
                Err(ProgressionStoreError::Conflict { .. }) => {
                    return Err(ProgressionError::Contended { employee, attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Sets the multiplier applied to `employee`'s future completions.
    ///
    /// XP already credited is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::Contended`] when every save lost a revision
    /// race, or [`ProgressionError::Store`] on store failure.
    pub async fn set_multiplier(
        &self,
        employee: EmployeeId,
        multiplier: XpMultiplier,
    ) -> ProgressionResult<EmployeeProgression> {
        let mut attempts = 0_u32;
        loop {
            attempts = attempts.saturating_add(1);
            let mut progression = self
                .store
                .load(employee)
                .await?
                .unwrap_or_else(|| EmployeeProgression::new(employee));
            progression.set_multiplier(multiplier);

            match self.store.save(&progression, progression.revision()).await {
                Ok(revision) => {
                    info!(employee_id = %employee, %multiplier, revision, "xp multiplier set");
                    return Ok(progression.with_revision(revision));
                }
                Err(ProgressionStoreError::Conflict { .. })
                    if attempts <= self.policy.conflict_retries =>
                {
                    debug!(employee_id = %employee, attempts, "multiplier save raced, reloading");
                }
                Err(ProgressionStoreError::Conflict { .. }) => {
                    return Err(ProgressionError::Contended { employee, attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns the derived levels of `employee`; zero for unknown employees.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::Store`] on store failure.
    pub async fn summary(&self, employee: EmployeeId) -> ProgressionResult<ProgressionSummary> {
        let progression = self
            .store
            .load(employee)
            .await?
            .unwrap_or_else(|| EmployeeProgression::new(employee));
        Ok(progression.summary(&self.config))
    }

    /// Re-derives every employee's progression from the full event log and
    /// replaces the stored projection. Returns the number of employees.
    ///
    /// Replayed completions are scaled by each employee's current
    /// multiplier; employees with a custom multiplier and no completions
    /// keep their record.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionError::Domain`] when the log is inconsistent, or
    /// [`ProgressionError::Store`] on store failure.
    pub async fn rebuild(&self, events: &[TaskEvent]) -> ProgressionResult<usize> {
        let mut board = TaskBoard::default();
        let mut progressions: BTreeMap<EmployeeId, EmployeeProgression> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|existing| !existing.multiplier().is_identity())
            .map(|existing| {
                let employee = existing.employee();
                let seeded =
                    EmployeeProgression::new(employee).with_multiplier(existing.multiplier());
                (employee, seeded)
            })
            .collect();
        for event in events {
            board.apply(event)?;
            let completion = board
                .aggregate(event.aggregate_id())
                .and_then(|task| Completion::detect(task, event));
            if let Some(found) = completion {
                progressions
                    .entry(found.employee)
                    .or_insert_with(|| EmployeeProgression::new(found.employee))
                    .credit(&found);
            }
        }

        let employees = progressions.len();
        self.store
            .replace(progressions.into_values().collect())
            .await?;
        info!(events = events.len(), employees, "progression rebuilt from event log");
        Ok(employees)
    }
}

#[async_trait]
impl<P> TaskEventObserver for ProgressionProjector<P>
where
    P: ProgressionStore,
{
    async fn on_event(&self, task: &TaskAggregate, event: &TaskEvent) -> Result<(), ObserverError> {
        self.project(task, event)
            .await
            .map(|_| ())
            .map_err(|err| ObserverError::new("progression", err))
    }
}
