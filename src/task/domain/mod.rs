//! Domain model for the task lifecycle.
//!
//! Tasks are event sourced: a [`TaskAggregate`] is a pure fold over its
//! [`TaskEvent`] history, and every command decides at most one new event.
//! No infrastructure concerns live inside this boundary.

mod aggregate;
mod board;
mod catalog;
mod error;
mod event;
mod ids;

pub use aggregate::{Assignment, TaskAggregate, TaskCommandKind, TaskStatus};
pub use board::{EmployeeTaskView, TaskBoard};
pub use catalog::{CatalogTask, DepartmentName, SkillName, TaskReward};
pub use error::{
    MAX_TEXT_LENGTH, MAX_TITLE_LENGTH, ParseTaskStatusError, TaskDomainError, TaskValidationError,
};
pub(crate) use error::{bounded_text, required_text};
pub use event::{TaskEvent, TaskEventKind, TaskEventPayload};
pub use ids::{AggregateId, EmployeeId, TaskId, Version};
