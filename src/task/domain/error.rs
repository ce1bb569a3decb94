//! Error types for task validation, transitions, and parsing.

use super::{AggregateId, TaskCommandKind, TaskStatus, Version};
use thiserror::Error;

/// Maximum length of task titles and catalog labels.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum length of task descriptions and resolution reasons.
pub const MAX_TEXT_LENGTH: usize = 500;

/// Errors raised while validating command fields, before any aggregate is
/// loaded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskValidationError {
    /// A required text field is empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeds its maximum length.
    #[error("{field} must be at most {max} characters, got {actual}")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum permitted length in characters.
        max: usize,
        /// Observed length in characters.
        actual: usize,
    },

    /// An identifier could not be parsed.
    #[error("invalid {field}: '{value}'")]
    InvalidIdentifier {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// Pagination parameters are out of range.
    #[error("limit must be between 1 and {max}, got {actual}")]
    InvalidLimit {
        /// Maximum permitted page size.
        max: usize,
        /// Requested page size.
        actual: usize,
    },
}

/// Errors returned when a command or event is illegal for the current state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The transition is not listed in the task state machine.
    #[error("task {aggregate_id} cannot {attempted} while {from}")]
    InvalidTransition {
        /// Aggregate that rejected the transition.
        aggregate_id: AggregateId,
        /// State the aggregate was in.
        from: TaskStatus,
        /// Command or event that was attempted.
        attempted: TaskCommandKind,
    },

    /// Submission requires an assigned task.
    #[error("task {aggregate_id} is not assigned (status {status})")]
    NotAssigned {
        /// Aggregate that rejected the submission.
        aggregate_id: AggregateId,
        /// Current status.
        status: TaskStatus,
    },

    /// Approval and rejection require a submitted task that needs approval.
    #[error("task {aggregate_id} is not awaiting approval (status {status})")]
    NotSubmittedOrNoApprovalNeeded {
        /// Aggregate that rejected the decision.
        aggregate_id: AggregateId,
        /// Current status.
        status: TaskStatus,
    },

    /// The task has already reached a terminal state.
    #[error("task {aggregate_id} is already {status}")]
    AlreadyTerminal {
        /// Aggregate that rejected the cancellation.
        aggregate_id: AggregateId,
        /// Terminal status.
        status: TaskStatus,
    },

    /// An event belonging to another aggregate was replayed.
    #[error("event for {found} replayed into task {expected}")]
    ForeignEvent {
        /// Aggregate being rebuilt.
        expected: AggregateId,
        /// Aggregate named by the event.
        found: AggregateId,
    },

    /// The event history contains a gap or reordering.
    #[error("task {aggregate_id} expected event sequence {expected}, found {found}")]
    SequenceGap {
        /// Aggregate being rebuilt.
        aggregate_id: AggregateId,
        /// Next expected sequence.
        expected: Version,
        /// Sequence carried by the event.
        found: Version,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Trims a required text field and enforces its maximum length.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyField { field });
    }
    bounded_text(field, trimmed, max)
}

/// Enforces the maximum length of an optional or free-form text field.
pub(crate) fn bounded_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, TaskValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(TaskValidationError::FieldTooLong { field, max, actual });
    }
    Ok(value.to_owned())
}
