//! `PostgreSQL` event store for task streams.

use super::{
    models::{NewTaskClaimRow, NewTaskEventRow, TaskEventRow},
    schema::{task_claims, task_events},
};
use crate::task::{
    domain::{AggregateId, TaskEvent, TaskEventPayload, TaskId, Version},
    ports::{EventStoreError, EventStoreResult, TaskEventStore},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed [`TaskEventStore`].
///
/// Each append runs in one transaction. The `(aggregate_id, sequence)`
/// primary key decides races between writers holding the same expected
/// version, and the `task_claims` primary key decides races between
/// assignments of the same catalog task.
#[derive(Debug, Clone)]
pub struct PostgresTaskEventStore {
    pool: TaskPgPool,
}

impl PostgresTaskEventStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> EventStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> EventStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(EventStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(EventStoreError::persistence)?
    }
}

impl From<DieselError> for EventStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskEventStore for PostgresTaskEventStore {
    async fn append(
        &self,
        expected_version: Version,
        event: &TaskEvent,
    ) -> EventStoreResult<Version> {
        let row = to_new_row(event)?;
        let aggregate_id = event.aggregate_id();
        let sequence = event.sequence();
        let claimed_task = event.claimed_task();
        let releases_claim = event.kind().is_terminal();

        self.run_blocking(move |connection| {
            connection.transaction::<_, EventStoreError, _>(|tx| {
                let actual = stream_head(tx, aggregate_id)?;
                if actual != expected_version || sequence != expected_version.next() {
                    return Err(EventStoreError::Conflict {
                        aggregate_id,
                        expected: expected_version,
                        actual,
                    });
                }

                if let Some(task_id) = claimed_task {
                    claim_task(tx, task_id, aggregate_id)?;
                }

                let inserted = diesel::insert_into(task_events::table)
                    .values(&row)
                    .on_conflict_do_nothing()
                    .execute(tx)?;
                if inserted == 0 {
                    return Err(EventStoreError::Conflict {
                        aggregate_id,
                        expected: expected_version,
                        actual: stream_head(tx, aggregate_id)?,
                    });
                }

                if releases_claim {
                    diesel::delete(
                        task_claims::table
                            .filter(task_claims::aggregate_id.eq(aggregate_id.into_inner())),
                    )
                    .execute(tx)?;
                }
                Ok(sequence)
            })
        })
        .await
    }

    async fn read_all(&self, aggregate_id: AggregateId) -> EventStoreResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            let rows = task_events::table
                .filter(task_events::aggregate_id.eq(aggregate_id.into_inner()))
                .order(task_events::sequence.asc())
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)?;
            rows.into_iter().map(row_to_event).collect()
        })
        .await
    }

    async fn read_stream(&self) -> EventStoreResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            let rows = task_events::table
                .order(task_events::position.asc())
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)?;
            rows.into_iter().map(row_to_event).collect()
        })
        .await
    }

    async fn active_aggregate_for(
        &self,
        task_id: TaskId,
    ) -> EventStoreResult<Option<AggregateId>> {
        self.run_blocking(move |connection| {
            let holder = find_claim_holder(connection, task_id)?;
            Ok(holder.map(AggregateId::from_uuid))
        })
        .await
    }
}

fn stream_head(
    connection: &mut PgConnection,
    aggregate_id: AggregateId,
) -> EventStoreResult<Version> {
    let head: Option<i64> = task_events::table
        .filter(task_events::aggregate_id.eq(aggregate_id.into_inner()))
        .select(diesel::dsl::max(task_events::sequence))
        .first(connection)?;
    to_version(head.unwrap_or(0))
}

fn claim_task(
    connection: &mut PgConnection,
    task_id: TaskId,
    aggregate_id: AggregateId,
) -> EventStoreResult<()> {
    let claimed = diesel::insert_into(task_claims::table)
        .values(&NewTaskClaimRow {
            task_id: task_id.into_inner(),
            aggregate_id: aggregate_id.into_inner(),
        })
        .on_conflict_do_nothing()
        .execute(connection)?;
    if claimed == 1 {
        return Ok(());
    }

    // The holder may have released the claim between the insert and this
    // lookup; report ourselves as the contender in that case.
    let holder = find_claim_holder(connection, task_id)?
        .map_or(aggregate_id, AggregateId::from_uuid);
    Err(EventStoreError::TaskClaimed { task_id, holder })
}

fn find_claim_holder(
    connection: &mut PgConnection,
    task_id: TaskId,
) -> EventStoreResult<Option<uuid::Uuid>> {
    Ok(task_claims::table
        .filter(task_claims::task_id.eq(task_id.into_inner()))
        .select(task_claims::aggregate_id)
        .first::<uuid::Uuid>(connection)
        .optional()?)
}

fn to_new_row(event: &TaskEvent) -> EventStoreResult<NewTaskEventRow> {
    let payload = serde_json::to_value(event.payload()).map_err(EventStoreError::persistence)?;
    let sequence =
        i64::try_from(event.sequence().value()).map_err(EventStoreError::persistence)?;

    Ok(NewTaskEventRow {
        aggregate_id: event.aggregate_id().into_inner(),
        sequence,
        kind: event.kind().as_str().to_owned(),
        payload,
        occurred_at: event.occurred_at(),
    })
}

fn row_to_event(row: TaskEventRow) -> EventStoreResult<TaskEvent> {
    let TaskEventRow {
        aggregate_id,
        sequence,
        kind,
        payload,
        occurred_at,
    } = row;

    let decoded = serde_json::from_value::<TaskEventPayload>(payload)
        .map_err(EventStoreError::persistence)?;
    if decoded.kind().as_str() != kind {
        return Err(EventStoreError::persistence(std::io::Error::other(format!(
            "kind column '{kind}' does not match payload tag '{}'",
            decoded.kind()
        ))));
    }

    Ok(TaskEvent::new(
        AggregateId::from_uuid(aggregate_id),
        to_version(sequence)?,
        occurred_at,
        decoded,
    ))
}

fn to_version(raw: i64) -> EventStoreResult<Version> {
    u64::try_from(raw)
        .map(Version::new)
        .map_err(EventStoreError::persistence)
}
