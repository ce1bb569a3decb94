//! Domain model for employee progression.
//!
//! Progression is a projection: XP is credited from task completions found in
//! the task event stream, and levels are derived from cumulative XP on read.

mod completion;
mod employee;
mod error;
mod levels;
mod multiplier;

pub use completion::Completion;
pub use employee::{CreditOutcome, EmployeeProgression, ProgressionSummary, SkillSummary};
pub use error::ProgressionConfigError;
pub use levels::{
    DEFAULT_LEVEL_THRESHOLDS, DEFAULT_SKILL_THRESHOLDS, LevelThresholds, ProgressionConfig,
};
pub use multiplier::XpMultiplier;
