//! Diesel row models for progression persistence.

use super::schema::employee_progressions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row model for employee progressions.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = employee_progressions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProgressionRow {
    /// Employee identifier.
    pub employee_id: uuid::Uuid,
    /// Cumulative XP.
    pub total_xp: i64,
    /// Serialised progression state.
    pub state: Value,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Time of the latest credit.
    pub updated_at: Option<DateTime<Utc>>,
}
