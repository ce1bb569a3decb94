//! XP crediting driven by task lifecycle events.

use super::helpers::{App, app};
use eyre::ensure;
use rstest::rstest;
use taskquest::task::{
    domain::{EmployeeId, TaskReward},
    ports::TaskEventStore,
    services::{ApproveTaskRequest, AssignTaskRequest, RejectTaskRequest, SubmitTaskRequest},
};

async fn complete(
    app: &App,
    employee: EmployeeId,
    title: &str,
    reward: TaskReward,
) -> Result<(), eyre::Report> {
    let task_id = app.offer(title, "Engineering", "rust", reward, false)?;
    let aggregate_id = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(task_id, employee, title))
        .await?;
    app.lifecycle
        .submit_task(SubmitTaskRequest::new(aggregate_id))
        .await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completions_accumulate_into_levels(app: App) -> Result<(), eyre::Report> {
    let employee = EmployeeId::new();
    for title in ["Port parser", "Add benchmarks", "Fix flaky test"] {
        complete(&app, employee, title, TaskReward::new(200, 60)).await?;
    }

    let summary = app.projector.summary(employee).await?;

    ensure!(summary.total_xp == 600);
    ensure!(summary.level == 1);
    ensure!(summary.missing_xp == 900);
    ensure!(summary.completed_tasks == 3);
    let [skill] = summary.skills.as_slice() else {
        eyre::bail!("expected a single skill, got {:?}", summary.skills);
    };
    ensure!(skill.skill.as_str() == "rust");
    ensure!(skill.xp == 180);
    ensure!(skill.level == 1);
    ensure!(skill.missing_xp == 70);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_approved_reviews_earn_xp(app: App) -> Result<(), eyre::Report> {
    let employee = EmployeeId::new();
    let mut aggregates = Vec::new();
    for title in ["Write RFC", "Write changelog"] {
        let task_id = app.offer(title, "Engineering", "writing", TaskReward::new(80, 30), true)?;
        let aggregate_id = app
            .lifecycle
            .assign_task(AssignTaskRequest::new(task_id, employee, title).with_requires_approval(true))
            .await?;
        app.lifecycle
            .submit_task(SubmitTaskRequest::new(aggregate_id))
            .await?;
        aggregates.push(aggregate_id);
    }
    let [approved, rejected] = aggregates.as_slice() else {
        eyre::bail!("expected two aggregates");
    };

    app.lifecycle
        .approve_task(ApproveTaskRequest::new(*approved, EmployeeId::new()))
        .await?;
    app.lifecycle
        .reject_task(RejectTaskRequest::new(*rejected, "needs data"))
        .await?;

    let summary = app.projector.summary(employee).await?;
    ensure!(summary.total_xp == 80);
    ensure!(summary.completed_tasks == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rebuild_from_the_log_reproduces_live_state(app: App) -> Result<(), eyre::Report> {
    let alice = EmployeeId::new();
    let bob = EmployeeId::new();
    complete(&app, alice, "Tune queries", TaskReward::new(300, 100)).await?;
    complete(&app, bob, "Review schema", TaskReward::new(700, 250)).await?;
    complete(&app, alice, "Trim indexes", TaskReward::new(250, 80)).await?;
    let live = [
        app.projector.summary(alice).await?,
        app.projector.summary(bob).await?,
    ];

    let employees = app.projector.rebuild(&app.events.read_stream().await?).await?;
    let rebuilt = [
        app.projector.summary(alice).await?,
        app.projector.summary(bob).await?,
    ];

    ensure!(employees == 2);
    ensure!(live == rebuilt);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_employees_start_at_zero(app: App) -> Result<(), eyre::Report> {
    let summary = app.projector.summary(EmployeeId::new()).await?;

    ensure!(summary.total_xp == 0);
    ensure!(summary.level == 0);
    ensure!(summary.missing_xp == 500);
    ensure!(summary.skills.is_empty());
    Ok(())
}
