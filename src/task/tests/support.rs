//! Shared builders for task unit tests.

use std::sync::Arc;

use crate::task::{
    adapters::memory::{InMemoryTaskCatalog, InMemoryTaskEventStore},
    domain::{
        AggregateId, Assignment, CatalogTask, DepartmentName, EmployeeId, SkillName, TaskEvent,
        TaskEventPayload, TaskId, TaskReward, Version,
    },
    services::{TaskLifecycleService, TaskQueryService},
};
use chrono::{TimeZone, Utc};
use mockable::DefaultClock;

pub(super) type MemoryService =
    TaskLifecycleService<InMemoryTaskEventStore, InMemoryTaskCatalog, DefaultClock>;

pub(super) struct Harness {
    pub store: Arc<InMemoryTaskEventStore>,
    pub catalog: Arc<InMemoryTaskCatalog>,
    pub service: MemoryService,
    pub queries: TaskQueryService<InMemoryTaskEventStore, InMemoryTaskCatalog>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryTaskEventStore::new());
    let catalog = Arc::new(InMemoryTaskCatalog::new());
    let service = TaskLifecycleService::new(
        Arc::clone(&store),
        Arc::clone(&catalog),
        Arc::new(DefaultClock),
    );
    let queries = TaskQueryService::new(Arc::clone(&store), Arc::clone(&catalog));
    Harness {
        store,
        catalog,
        service,
        queries,
    }
}

pub(super) fn catalog_task(title: &str, department: &str, skill: &str) -> CatalogTask {
    CatalogTask::new(
        title,
        DepartmentName::new(department).expect("valid department"),
        SkillName::new(skill).expect("valid skill"),
    )
    .expect("valid catalog task")
    .with_reward(TaskReward::new(50, 20))
}

pub(super) fn assignment(requires_approval: bool) -> Assignment {
    Assignment {
        task_id: TaskId::new(),
        assigned_to: EmployeeId::new(),
        title: "Write onboarding guide".to_owned(),
        description: String::new(),
        department: DepartmentName::new("Engineering").expect("valid department"),
        skill: SkillName::new("writing").expect("valid skill"),
        requires_approval,
        reward: TaskReward::new(50, 20),
    }
}

pub(super) fn event(
    aggregate_id: AggregateId,
    sequence: u64,
    payload: TaskEventPayload,
) -> TaskEvent {
    let occurred_at = Utc
        .timestamp_opt(1_700_000_000 + i64::try_from(sequence).expect("small sequence"), 0)
        .single()
        .expect("valid timestamp");
    TaskEvent::new(aggregate_id, Version::new(sequence), occurred_at, payload)
}

pub(super) fn assigned(aggregate_id: AggregateId, assignment: &Assignment) -> TaskEvent {
    event(
        aggregate_id,
        1,
        TaskEventPayload::Assigned {
            task_id: assignment.task_id,
            assigned_to: assignment.assigned_to,
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            department: assignment.department.clone(),
            skill: assignment.skill.clone(),
            requires_approval: assignment.requires_approval,
            reward: assignment.reward,
        },
    )
}
