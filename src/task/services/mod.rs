//! Application services for task lifecycle orchestration.

mod error;
mod lifecycle;
mod queries;

pub use error::{FailureClass, TaskLifecycleError, TaskLifecycleResult};
pub use lifecycle::{
    ApproveTaskRequest, AssignTaskRequest, CancelTaskRequest, CommandPolicy, RejectTaskRequest,
    SubmitTaskRequest, TaskLifecycleService,
};
pub use queries::{
    AvailableTaskView, AvailableTasksQuery, MAX_PAGE_SIZE, Page, Pagination, TaskQueryService,
};
