//! Given steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskquest::task::{
    domain::{CatalogTask, DepartmentName, SkillName, TaskReward},
    services::{AssignTaskRequest, CancelTaskRequest, SubmitTaskRequest},
};

#[given(
    r#"a catalog task "{title}" in "{department}" training "{skill}" worth {person_xp:u64} XP and {skill_xp:u64} skill XP"#
)]
fn catalog_task(
    world: &mut TaskWorkflowWorld,
    title: String,
    department: String,
    skill: String,
    person_xp: u64,
    skill_xp: u64,
) -> Result<(), eyre::Report> {
    let entry = CatalogTask::new(
        title,
        DepartmentName::new(department)?,
        SkillName::new(skill)?,
    )?
    .with_reward(TaskReward::new(person_xp, skill_xp));
    world.catalog_task = Some(entry.id());
    world.catalog.insert(entry)?;
    Ok(())
}

fn assign(world: &mut TaskWorkflowWorld, requires_approval: bool) -> Result<(), eyre::Report> {
    let task_id = world.catalog_task()?;
    let aggregate_id = run_async(world.service.assign_task(
        AssignTaskRequest::new(task_id, world.employee, "Scenario task")
            .with_requires_approval(requires_approval),
    ))
    .wrap_err("assign task in scenario setup")?;
    world.aggregate_id = Some(aggregate_id);
    Ok(())
}

#[given("the task is assigned with approval required")]
fn assigned_with_approval(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    assign(world, true)
}

#[given("the task is assigned without approval")]
fn assigned_without_approval(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    assign(world, false)
}

#[given("the employee has submitted the task")]
fn employee_has_submitted(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let aggregate_id = world.aggregate()?;
    run_async(world.service.submit_task(SubmitTaskRequest::new(aggregate_id)))
        .wrap_err("submit task in scenario setup")?;
    Ok(())
}

#[given("the task has been cancelled")]
fn task_has_been_cancelled(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let aggregate_id = world.aggregate()?;
    run_async(
        world
            .service
            .cancel_task(CancelTaskRequest::new(aggregate_id).with_reason("no longer needed")),
    )
    .wrap_err("cancel task in scenario setup")?;
    Ok(())
}
