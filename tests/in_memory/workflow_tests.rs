//! End-to-end task workflows through the public services.

use super::helpers::{App, app};
use eyre::ensure;
use rstest::rstest;
use taskquest::task::{
    domain::{EmployeeId, TaskDomainError, TaskEventKind, TaskReward, TaskStatus},
    services::{
        ApproveTaskRequest, AssignTaskRequest, CancelTaskRequest, FailureClass,
        RejectTaskRequest, SubmitTaskRequest, TaskLifecycleError,
    },
};

fn kinds(events: &[taskquest::task::domain::TaskEvent]) -> Vec<TaskEventKind> {
    events.iter().map(taskquest::task::domain::TaskEvent::kind).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reviewed_task_runs_from_assignment_to_approval(app: App) -> Result<(), eyre::Report> {
    let employee = EmployeeId::new();
    let reviewer = EmployeeId::new();
    let task_id = app.offer("Audit invoices", "Finance", "accounting", TaskReward::new(120, 40), true)?;

    let aggregate_id = app
        .lifecycle
        .assign_task(
            AssignTaskRequest::new(task_id, employee, "Audit invoices")
                .with_description("Q3 supplier invoices")
                .with_requires_approval(true),
        )
        .await?;
    app.lifecycle
        .submit_task(SubmitTaskRequest::new(aggregate_id))
        .await?;
    let pending = app.lifecycle.load_task(aggregate_id).await?;
    ensure!(pending.status() == TaskStatus::Submitted);

    app.lifecycle
        .approve_task(ApproveTaskRequest::new(aggregate_id, reviewer))
        .await?;

    let task = app.lifecycle.load_task(aggregate_id).await?;
    ensure!(task.status() == TaskStatus::Approved);
    ensure!(task.approved_by() == Some(reviewer));
    ensure!(task.version().value() == 3);
    let history = app.queries.task_history(aggregate_id).await?;
    ensure!(
        kinds(&history)
            == [
                TaskEventKind::Assigned,
                TaskEventKind::Submitted,
                TaskEventKind::Approved
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreviewed_task_is_closed_on_submission(app: App) -> Result<(), eyre::Report> {
    let task_id = app.offer("Restock shelves", "Retail", "logistics", TaskReward::new(30, 10), false)?;
    let aggregate_id = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(task_id, EmployeeId::new(), "Restock shelves"))
        .await?;

    let submitted = app
        .lifecycle
        .submit_task(SubmitTaskRequest::new(aggregate_id))
        .await?;

    ensure!(submitted.kind() == TaskEventKind::Submitted);
    let task = app.lifecycle.load_task(aggregate_id).await?;
    ensure!(task.status() == TaskStatus::Approved);
    ensure!(task.approved_by().is_none());
    ensure!(app.events.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_task_keeps_its_reason_and_frees_the_catalog_entry(
    app: App,
) -> Result<(), eyre::Report> {
    let employee = EmployeeId::new();
    let task_id = app.offer("Draft press release", "Marketing", "copywriting", TaskReward::new(60, 25), true)?;
    let aggregate_id = app
        .lifecycle
        .assign_task(
            AssignTaskRequest::new(task_id, employee, "Draft press release")
                .with_requires_approval(true),
        )
        .await?;
    app.lifecycle
        .submit_task(SubmitTaskRequest::new(aggregate_id))
        .await?;

    app.lifecycle
        .reject_task(RejectTaskRequest::new(aggregate_id, "  tone is off  "))
        .await?;

    let task = app.lifecycle.load_task(aggregate_id).await?;
    ensure!(task.status() == TaskStatus::Rejected);
    ensure!(task.resolution_reason() == Some("tone is off"));
    let reassigned = app
        .lifecycle
        .assign_task(
            AssignTaskRequest::new(task_id, employee, "Draft press release, take two")
                .with_requires_approval(true),
        )
        .await?;
    ensure!(reassigned != aggregate_id);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn terminal_tasks_refuse_further_commands(app: App) -> Result<(), eyre::Report> {
    let task_id = app.offer("Rotate keys", "Security", "operations", TaskReward::new(40, 15), false)?;
    let aggregate_id = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(task_id, EmployeeId::new(), "Rotate keys"))
        .await?;
    app.lifecycle
        .cancel_task(CancelTaskRequest::new(aggregate_id).with_reason("superseded"))
        .await?;

    let submit = app
        .lifecycle
        .submit_task(SubmitTaskRequest::new(aggregate_id))
        .await;
    let cancel = app
        .lifecycle
        .cancel_task(CancelTaskRequest::new(aggregate_id))
        .await;

    ensure!(matches!(
        submit,
        Err(TaskLifecycleError::Domain(TaskDomainError::NotAssigned {
            status: TaskStatus::Cancelled,
            ..
        }))
    ));
    ensure!(matches!(
        cancel,
        Err(TaskLifecycleError::Domain(TaskDomainError::AlreadyTerminal { .. }))
    ));
    ensure!(app.events.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failures_are_classified_for_callers(app: App) -> Result<(), eyre::Report> {
    let task_id = app.offer("Plan offsite", "People", "planning", TaskReward::new(20, 5), false)?;
    let employee = EmployeeId::new();
    app.lifecycle
        .assign_task(AssignTaskRequest::new(task_id, employee, "Plan offsite"))
        .await?;

    let blank_title = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(task_id, employee, "   "))
        .await;
    let duplicate = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(task_id, employee, "Plan offsite"))
        .await;
    let unknown = app
        .lifecycle
        .submit_task(SubmitTaskRequest::new(
            taskquest::task::domain::AggregateId::new(),
        ))
        .await;

    ensure!(blank_title.is_err_and(|err| err.class() == FailureClass::Validation));
    ensure!(duplicate.is_err_and(|err| err.class() == FailureClass::DomainRule && !err.is_retryable()));
    ensure!(unknown.is_err_and(|err| err.class() == FailureClass::NotFound));
    Ok(())
}
