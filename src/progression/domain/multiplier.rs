//! Per-employee scaling of the XP a completion awards.

use serde::{Deserialize, Serialize};
use std::fmt;

const BASIS_POINTS_PER_UNIT: u128 = 10_000;

/// XP multiplier in basis points; `10_000` awards the task's XP unchanged.
///
/// Scaled XP is truncated toward zero, so `1.5x` of 25 XP awards 37.
///
/// # Example
///
/// ```
/// use taskquest::progression::domain::XpMultiplier;
///
/// let boosted = XpMultiplier::from_basis_points(15_000);
/// assert_eq!(boosted.apply(25), 37);
/// assert_eq!(XpMultiplier::default().apply(25), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct XpMultiplier(u32);

impl XpMultiplier {
    /// Awards XP unchanged.
    pub const IDENTITY: Self = Self(10_000);

    /// Creates a multiplier from basis points.
    #[must_use]
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    /// Returns the multiplier in basis points.
    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// Returns `true` when XP is awarded unchanged.
    #[must_use]
    pub const fn is_identity(self) -> bool {
        self.0 == Self::IDENTITY.0
    }

    /// Scales `xp`, truncating any fraction and saturating at `u64::MAX`.
    #[must_use]
    pub fn apply(self, xp: u64) -> u64 {
        let scaled = u128::from(xp).saturating_mul(u128::from(self.0));
        scaled
            .checked_div(BASIS_POINTS_PER_UNIT)
            .map_or(u64::MAX, |whole| u64::try_from(whole).unwrap_or(u64::MAX))
    }
}

impl Default for XpMultiplier {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for XpMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
