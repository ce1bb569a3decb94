//! Then steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::then;
use taskquest::task::{
    domain::TaskStatus,
    services::{FailureClass, TaskLifecycleError},
};

fn last_result(world: &TaskWorkflowWorld) -> Result<&Result<(), TaskLifecycleError>, eyre::Report> {
    world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing command result"))
}

#[then("the command succeeds")]
fn command_succeeds(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    if let Err(err) = last_result(world)? {
        return Err(eyre::eyre!("expected success, got {err}"));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = run_async(world.service.load_task(world.aggregate()?))?;

    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("the employee has {xp:u64} XP at level {level:u32}")]
fn employee_has_xp(world: &TaskWorkflowWorld, xp: u64, level: u32) -> Result<(), eyre::Report> {
    let summary = run_async(world.projector.summary(world.employee))?;

    if summary.total_xp != xp || summary.level != level {
        return Err(eyre::eyre!(
            "expected {xp} XP at level {level}, found {} XP at level {}",
            summary.total_xp,
            summary.level
        ));
    }
    Ok(())
}

#[then("the assignment is refused because the task is held")]
fn assignment_refused(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(TaskLifecycleError::AlreadyAssigned { .. })) {
        return Err(eyre::eyre!("expected AlreadyAssigned error, got {result:?}"));
    }
    Ok(())
}

#[then("the command is refused as a domain rule violation")]
fn command_refused(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(err) if err.class() == FailureClass::DomainRule) {
        return Err(eyre::eyre!("expected a domain rule violation, got {result:?}"));
    }
    Ok(())
}
