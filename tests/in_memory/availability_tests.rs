//! Catalog availability and employee task listings.

use super::helpers::{App, app};
use eyre::ensure;
use rstest::rstest;
use taskquest::task::{
    domain::{DepartmentName, EmployeeId, TaskReward, TaskStatus},
    services::{
        AssignTaskRequest, AvailableTasksQuery, CancelTaskRequest, Pagination, SubmitTaskRequest,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assigned_entries_leave_the_offer_until_released(app: App) -> Result<(), eyre::Report> {
    let sweep = app.offer("Sweep floor", "Facilities", "cleaning", TaskReward::new(10, 5), false)?;
    app.offer("Water plants", "Facilities", "gardening", TaskReward::new(10, 5), false)?;
    let query = AvailableTasksQuery::default();

    let aggregate_id = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(sweep, EmployeeId::new(), "Sweep floor"))
        .await?;
    let while_held = app.queries.available_tasks(&query).await?;
    app.lifecycle
        .cancel_task(CancelTaskRequest::new(aggregate_id))
        .await?;
    let after_release = app.queries.available_tasks(&query).await?;

    ensure!(while_held.count == 1);
    ensure!(while_held.items.iter().all(|item| item.task_id != sweep));
    ensure!(after_release.count == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn offers_filter_by_department_and_group(app: App) -> Result<(), eyre::Report> {
    for (title, department) in [
        ("Close ledger", "Finance"),
        ("File expenses", "Finance"),
        ("Fix printer", "IT"),
    ] {
        app.offer(title, department, "general", TaskReward::new(15, 5), false)?;
    }

    let finance = app
        .queries
        .available_tasks(&AvailableTasksQuery {
            department: Some(DepartmentName::new("Finance")?),
            ..AvailableTasksQuery::default()
        })
        .await?;
    let grouped = app
        .queries
        .available_tasks(&AvailableTasksQuery::default())
        .await?
        .group_by_department();

    ensure!(finance.count == 2);
    ensure!(grouped.keys().map(String::as_str).eq(["Finance", "IT"]));
    ensure!(grouped.get("Finance").map(Vec::len) == Some(2));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn employee_listing_reflects_current_status(app: App) -> Result<(), eyre::Report> {
    let employee = EmployeeId::new();
    let colleague = EmployeeId::new();
    let first = app.offer("Label boxes", "Warehouse", "logistics", TaskReward::new(10, 5), false)?;
    let second = app.offer("Count stock", "Warehouse", "logistics", TaskReward::new(10, 5), false)?;
    let third = app.offer("Load van", "Warehouse", "logistics", TaskReward::new(10, 5), false)?;

    let done = app
        .lifecycle
        .assign_task(AssignTaskRequest::new(first, employee, "Label boxes"))
        .await?;
    app.lifecycle
        .submit_task(SubmitTaskRequest::new(done))
        .await?;
    app.lifecycle
        .assign_task(AssignTaskRequest::new(second, employee, "Count stock"))
        .await?;
    app.lifecycle
        .assign_task(AssignTaskRequest::new(third, colleague, "Load van"))
        .await?;

    let page = app
        .queries
        .employee_tasks(employee, Pagination::default())
        .await?;

    ensure!(page.count == 2);
    ensure!(page.items.iter().all(|view| view.assigned_to == employee));
    let statuses: Vec<TaskStatus> = page.items.iter().map(|view| view.status).collect();
    ensure!(statuses.contains(&TaskStatus::Approved));
    ensure!(statuses.contains(&TaskStatus::Assigned));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_pages_are_rejected(app: App) {
    let result = app
        .queries
        .employee_tasks(
            EmployeeId::new(),
            Pagination {
                skip: 0,
                limit: 5_000,
            },
        )
        .await;

    assert!(result.is_err_and(|err| err.class() == taskquest::task::services::FailureClass::Validation));
}
