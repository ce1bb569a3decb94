//! `PostgreSQL` task catalog.

use super::{event_store::TaskPgPool, models::CatalogTaskRow, schema::available_tasks};
use crate::task::{
    domain::{CatalogTask, DepartmentName, SkillName, TaskId, TaskReward},
    ports::{CatalogError, CatalogResult, TaskCatalog},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed [`TaskCatalog`] over the `available_tasks` table.
#[derive(Debug, Clone)]
pub struct PostgresTaskCatalog {
    pool: TaskPgPool,
}

impl PostgresTaskCatalog {
    /// Creates a new catalog from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CatalogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CatalogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(CatalogError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(CatalogError::persistence)?
    }
}

#[async_trait]
impl TaskCatalog for PostgresTaskCatalog {
    async fn find(&self, id: TaskId) -> CatalogResult<Option<CatalogTask>> {
        self.run_blocking(move |connection| {
            let row = available_tasks::table
                .filter(available_tasks::id.eq(id.into_inner()))
                .select(CatalogTaskRow::as_select())
                .first::<CatalogTaskRow>(connection)
                .optional()
                .map_err(CatalogError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(&self) -> CatalogResult<Vec<CatalogTask>> {
        self.run_blocking(move |connection| {
            let rows = available_tasks::table
                .order((available_tasks::title.asc(), available_tasks::id.asc()))
                .select(CatalogTaskRow::as_select())
                .load::<CatalogTaskRow>(connection)
                .map_err(CatalogError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn add(&self, task: &CatalogTask) -> CatalogResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(available_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CatalogError::DuplicateTask(task_id)
                    }
                    _ => CatalogError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }
}

fn to_row(task: &CatalogTask) -> CatalogResult<CatalogTaskRow> {
    let reward = task.reward();
    Ok(CatalogTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        department: task.department().as_str().to_owned(),
        skill: task.skill().as_str().to_owned(),
        requires_approval: task.requires_approval(),
        person_xp: i64::try_from(reward.person_xp).map_err(CatalogError::persistence)?,
        skill_xp: i64::try_from(reward.skill_xp).map_err(CatalogError::persistence)?,
        is_active: task.is_active(),
    })
}

fn row_to_task(row: CatalogTaskRow) -> CatalogResult<CatalogTask> {
    let department = DepartmentName::new(&row.department).map_err(CatalogError::persistence)?;
    let skill = SkillName::new(&row.skill).map_err(CatalogError::persistence)?;
    let reward = TaskReward::new(
        u64::try_from(row.person_xp).map_err(CatalogError::persistence)?,
        u64::try_from(row.skill_xp).map_err(CatalogError::persistence)?,
    );

    Ok(CatalogTask::new(&row.title, department, skill)
        .map_err(CatalogError::persistence)?
        .with_id(TaskId::from_uuid(row.id))
        .with_description(&row.description)
        .map_err(CatalogError::persistence)?
        .with_requires_approval(row.requires_approval)
        .with_reward(reward)
        .with_active(row.is_active))
}
