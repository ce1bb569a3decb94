//! Diesel row models for task persistence.

use super::schema::{available_tasks, task_claims, task_events};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Stream identifier.
    pub aggregate_id: uuid::Uuid,
    /// Per-stream sequence.
    pub sequence: i64,
    /// Event kind.
    pub kind: String,
    /// Payload JSON.
    pub payload: Value,
    /// Decision timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Insert model for task events; the global position is assigned by the
/// database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow {
    /// Stream identifier.
    pub aggregate_id: uuid::Uuid,
    /// Per-stream sequence.
    pub sequence: i64,
    /// Event kind.
    pub kind: String,
    /// Payload JSON.
    pub payload: Value,
    /// Decision timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Insert model for task claims.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_claims)]
pub struct NewTaskClaimRow {
    /// Claimed catalog task.
    pub task_id: uuid::Uuid,
    /// Claiming aggregate.
    pub aggregate_id: uuid::Uuid,
}

/// Row model for catalog tasks.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = available_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CatalogTaskRow {
    /// Catalog identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Owning department.
    pub department: String,
    /// Trained skill.
    pub skill: String,
    /// Whether completion needs approval.
    pub requires_approval: bool,
    /// XP credited to the employee.
    pub person_xp: i64,
    /// XP credited to the skill.
    pub skill_xp: i64,
    /// Whether the entry is offered.
    pub is_active: bool,
}
