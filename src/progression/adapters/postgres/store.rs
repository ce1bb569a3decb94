//! `PostgreSQL` progression store.

use super::{models::ProgressionRow, schema::employee_progressions};
use crate::progression::{
    domain::EmployeeProgression,
    ports::{ProgressionStore, ProgressionStoreError, ProgressionStoreResult},
};
use crate::task::domain::EmployeeId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by progression adapters.
pub type ProgressionPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed [`ProgressionStore`].
///
/// Saves are conditional updates on the `revision` column, so two projector
/// instances crediting the same employee cannot overwrite each other.
#[derive(Debug, Clone)]
pub struct PostgresProgressionStore {
    pool: ProgressionPgPool,
}

impl PostgresProgressionStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProgressionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProgressionStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProgressionStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProgressionStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProgressionStoreError::persistence)?
    }
}

impl From<DieselError> for ProgressionStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl ProgressionStore for PostgresProgressionStore {
    async fn load(
        &self,
        employee: EmployeeId,
    ) -> ProgressionStoreResult<Option<EmployeeProgression>> {
        self.run_blocking(move |connection| {
            let row = employee_progressions::table
                .filter(employee_progressions::employee_id.eq(employee.into_inner()))
                .select(ProgressionRow::as_select())
                .first::<ProgressionRow>(connection)
                .optional()?;
            row.map(row_to_progression).transpose()
        })
        .await
    }

    async fn save(
        &self,
        progression: &EmployeeProgression,
        expected_revision: u64,
    ) -> ProgressionStoreResult<u64> {
        let employee = progression.employee();
        let revision = expected_revision.saturating_add(1);
        let row = to_row(progression, revision)?;
        let expected = to_column(expected_revision)?;

        self.run_blocking(move |connection| {
            let written = if expected == 0 {
                diesel::insert_into(employee_progressions::table)
                    .values(&row)
                    .on_conflict_do_nothing()
                    .execute(connection)?
            } else {
                diesel::update(
                    employee_progressions::table
                        .filter(employee_progressions::employee_id.eq(row.employee_id))
                        .filter(employee_progressions::revision.eq(expected)),
                )
                .set((
                    employee_progressions::total_xp.eq(row.total_xp),
                    employee_progressions::state.eq(&row.state),
                    employee_progressions::revision.eq(row.revision),
                    employee_progressions::updated_at.eq(row.updated_at),
                ))
                .execute(connection)?
            };
            if written == 1 {
                return Ok(revision);
            }

            let actual: Option<i64> = employee_progressions::table
                .filter(employee_progressions::employee_id.eq(row.employee_id))
                .select(employee_progressions::revision)
                .first(connection)
                .optional()?;
            Err(ProgressionStoreError::Conflict {
                employee,
                expected: expected_revision,
                actual: from_column(actual.unwrap_or(0))?,
            })
        })
        .await
    }

    async fn list(&self) -> ProgressionStoreResult<Vec<EmployeeProgression>> {
        self.run_blocking(|connection| {
            employee_progressions::table
                .order(employee_progressions::employee_id.asc())
                .select(ProgressionRow::as_select())
                .load::<ProgressionRow>(connection)?
                .into_iter()
                .map(row_to_progression)
                .collect()
        })
        .await
    }

    async fn replace(&self, progressions: Vec<EmployeeProgression>) -> ProgressionStoreResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, ProgressionStoreError, _>(|tx| {
                let previous: Vec<(uuid::Uuid, i64)> = employee_progressions::table
                    .select((
                        employee_progressions::employee_id,
                        employee_progressions::revision,
                    ))
                    .load(tx)?;
                diesel::delete(employee_progressions::table).execute(tx)?;

                let rows = progressions
                    .iter()
                    .map(|progression| {
                        let employee = progression.employee().into_inner();
                        let prior = previous
                            .iter()
                            .find(|(id, _)| *id == employee)
                            .map_or(Ok(0), |(_, revision)| from_column(*revision))?;
                        to_row(progression, prior.saturating_add(1))
                    })
                    .collect::<ProgressionStoreResult<Vec<_>>>()?;
                if !rows.is_empty() {
                    diesel::insert_into(employee_progressions::table)
                        .values(&rows)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }
}

fn to_row(progression: &EmployeeProgression, revision: u64) -> ProgressionStoreResult<ProgressionRow> {
    Ok(ProgressionRow {
        employee_id: progression.employee().into_inner(),
        total_xp: to_column(progression.total_xp())?,
        state: serde_json::to_value(progression).map_err(ProgressionStoreError::persistence)?,
        revision: to_column(revision)?,
        updated_at: progression.updated_at(),
    })
}

fn row_to_progression(row: ProgressionRow) -> ProgressionStoreResult<EmployeeProgression> {
    let progression = serde_json::from_value::<EmployeeProgression>(row.state)
        .map_err(ProgressionStoreError::persistence)?;
    Ok(progression.with_revision(from_column(row.revision)?))
}

fn to_column(value: u64) -> ProgressionStoreResult<i64> {
    i64::try_from(value).map_err(ProgressionStoreError::persistence)
}

fn from_column(value: i64) -> ProgressionStoreResult<u64> {
    u64::try_from(value).map_err(ProgressionStoreError::persistence)
}
