//! Error types for progression configuration.

use thiserror::Error;

/// Errors raised while building level tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgressionConfigError {
    /// A threshold table has no entries.
    #[error("threshold table must not be empty")]
    EmptyThresholds,

    /// Level zero must need no XP.
    #[error("threshold table must start at 0, got {first}")]
    NonZeroStart {
        /// First threshold found.
        first: u64,
    },

    /// Thresholds must grow with every level.
    #[error("threshold for level {level} ({current}) must exceed {previous}")]
    NotIncreasing {
        /// Offending level.
        level: usize,
        /// Threshold of the level below.
        previous: u64,
        /// Threshold of the offending level.
        current: u64,
    },

    /// The configuration document could not be parsed.
    #[error("invalid progression configuration: {0}")]
    Parse(String),
}
