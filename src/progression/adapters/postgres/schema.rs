//! Diesel schema for progression persistence.

diesel::table! {
    /// Projected XP per employee.
    employee_progressions (employee_id) {
        /// Employee identifier.
        employee_id -> Uuid,
        /// Cumulative XP, duplicated from the state for ranking queries.
        total_xp -> Int8,
        /// Serialised progression state.
        state -> Jsonb,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Time of the latest credit.
        updated_at -> Nullable<Timestamptz>,
    }
}
