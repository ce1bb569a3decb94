//! Level threshold tables and progression configuration.

use super::ProgressionConfigError;
use serde::{Deserialize, Serialize};

/// Default cumulative XP needed for each employee level.
pub const DEFAULT_LEVEL_THRESHOLDS: [u64; 11] = [
    0, 500, 1500, 2100, 4500, 6300, 8500, 12000, 14000, 16000, 20000,
];

/// Default cumulative XP needed for each skill level.
pub const DEFAULT_SKILL_THRESHOLDS: [u64; 7] = [0, 100, 250, 500, 1000, 2000, 4000];

/// Strictly increasing XP thresholds; entry `n` is the XP needed for level `n`.
///
/// # Example
///
/// ```
/// use taskquest::progression::domain::LevelThresholds;
///
/// let thresholds = LevelThresholds::new(vec![0, 100, 250]).expect("valid table");
/// assert_eq!(thresholds.level_for_xp(50), 0);
/// assert_eq!(thresholds.missing_xp(50), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct LevelThresholds(Vec<u64>);

impl LevelThresholds {
    /// Creates a validated threshold table.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionConfigError`] when the table is empty, does not
    /// start at zero, or is not strictly increasing.
    pub fn new(thresholds: Vec<u64>) -> Result<Self, ProgressionConfigError> {
        match thresholds.first() {
            None => return Err(ProgressionConfigError::EmptyThresholds),
            Some(&first) if first != 0 => {
                return Err(ProgressionConfigError::NonZeroStart { first });
            }
            Some(_) => {}
        }
        for (index, pair) in thresholds.windows(2).enumerate() {
            if let &[previous, current] = pair
                && current <= previous
            {
                return Err(ProgressionConfigError::NotIncreasing {
                    level: index + 1,
                    previous,
                    current,
                });
            }
        }
        Ok(Self(thresholds))
    }

    /// Returns the highest level whose threshold `xp` has reached.
    #[must_use]
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        let reached = self.0.partition_point(|threshold| *threshold <= xp);
        level_index(reached.saturating_sub(1))
    }

    /// Returns the XP needed for `level`, or `None` beyond the table.
    #[must_use]
    pub fn threshold_for(&self, level: u32) -> Option<u64> {
        usize::try_from(level)
            .ok()
            .and_then(|index| self.0.get(index).copied())
    }

    /// Returns the XP still needed to reach the next level; `0` at the top.
    #[must_use]
    pub fn missing_xp(&self, xp: u64) -> u64 {
        let next = self.level_for_xp(xp).saturating_add(1);
        self.threshold_for(next)
            .map_or(0, |threshold| threshold.saturating_sub(xp))
    }

    /// Returns the highest reachable level.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        level_index(self.0.len().saturating_sub(1))
    }

    /// Returns the raw table.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

fn level_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

impl TryFrom<Vec<u64>> for LevelThresholds {
    type Error = ProgressionConfigError;

    fn try_from(value: Vec<u64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LevelThresholds> for Vec<u64> {
    fn from(value: LevelThresholds) -> Self {
        value.0
    }
}

/// Threshold tables used to derive employee and skill levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Employee level table.
    pub level_thresholds: LevelThresholds,
    /// Per-skill level table.
    pub skill_thresholds: LevelThresholds,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            level_thresholds: LevelThresholds(DEFAULT_LEVEL_THRESHOLDS.to_vec()),
            skill_thresholds: LevelThresholds(DEFAULT_SKILL_THRESHOLDS.to_vec()),
        }
    }
}

impl ProgressionConfig {
    /// Parses a JSON document; missing tables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressionConfigError::Parse`] for malformed JSON or an
    /// invalid table.
    pub fn from_json_str(raw: &str) -> Result<Self, ProgressionConfigError> {
        serde_json::from_str(raw).map_err(|err| ProgressionConfigError::Parse(err.to_string()))
    }
}
