//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Append-only task event log.
    task_events (aggregate_id, sequence) {
        /// Stream the event belongs to.
        aggregate_id -> Uuid,
        /// Per-stream sequence, gapless from 1.
        sequence -> Int8,
        /// Global commit position.
        position -> Int8,
        /// Event kind, duplicated from the payload for querying.
        #[max_length = 32]
        kind -> Varchar,
        /// Kind-specific payload.
        payload -> Jsonb,
        /// Decision timestamp.
        occurred_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalog tasks held by a non-terminal aggregate.
    task_claims (task_id) {
        /// Claimed catalog task.
        task_id -> Uuid,
        /// Aggregate holding the claim.
        aggregate_id -> Uuid,
    }
}

diesel::table! {
    /// Assignable task definitions.
    available_tasks (id) {
        /// Catalog identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Owning department.
        #[max_length = 255]
        department -> Varchar,
        /// Trained skill.
        #[max_length = 255]
        skill -> Varchar,
        /// Whether completion needs approval.
        requires_approval -> Bool,
        /// XP credited to the employee.
        person_xp -> Int8,
        /// XP credited to the skill.
        skill_xp -> Int8,
        /// Whether the entry is offered.
        is_active -> Bool,
    }
}
