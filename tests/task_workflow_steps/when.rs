//! When steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::when;
use taskquest::task::{
    domain::EmployeeId,
    services::{ApproveTaskRequest, AssignTaskRequest, RejectTaskRequest, SubmitTaskRequest},
};

#[when("the employee submits the task")]
fn employee_submits(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let aggregate_id = world.aggregate()?;
    let result = run_async(world.service.submit_task(SubmitTaskRequest::new(aggregate_id)));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when("a reviewer approves the task")]
fn reviewer_approves(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let aggregate_id = world.aggregate()?;
    let result = run_async(
        world
            .service
            .approve_task(ApproveTaskRequest::new(aggregate_id, EmployeeId::new())),
    );
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#"a reviewer rejects the task because "{reason}""#)]
fn reviewer_rejects(world: &mut TaskWorkflowWorld, reason: String) -> Result<(), eyre::Report> {
    let aggregate_id = world.aggregate()?;
    let result = run_async(world.service.reject_task(
        RejectTaskRequest::new(aggregate_id, reason).rejected_by(EmployeeId::new()),
    ));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when("the task is assigned again")]
fn task_assigned_again(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world.catalog_task()?;
    let result = run_async(world.service.assign_task(AssignTaskRequest::new(
        task_id,
        EmployeeId::new(),
        "Second attempt",
    )));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}
