//! Per-employee XP totals and the summaries derived from them.

use super::{Completion, ProgressionConfig, XpMultiplier};
use crate::task::domain::{AggregateId, EmployeeId, SkillName, Version};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of crediting a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    /// XP was added.
    Applied,
    /// The completion was already counted; nothing changed.
    AlreadyApplied,
}

/// Accumulated XP of one employee.
///
/// Levels are never stored; they are derived from cumulative XP through a
/// [`ProgressionConfig`] so that changing the tables needs no migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProgression {
    employee: EmployeeId,
    total_xp: u64,
    completed_tasks: u64,
    skills: BTreeMap<SkillName, u64>,
    watermarks: BTreeMap<AggregateId, Version>,
    #[serde(default)]
    multiplier: XpMultiplier,
    revision: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl EmployeeProgression {
    /// Creates an employee with no XP at revision zero.
    #[must_use]
    pub const fn new(employee: EmployeeId) -> Self {
        Self {
            employee,
            total_xp: 0,
            completed_tasks: 0,
            skills: BTreeMap::new(),
            watermarks: BTreeMap::new(),
            multiplier: XpMultiplier::IDENTITY,
            revision: 0,
            updated_at: None,
        }
    }

    /// Adds the completion's XP unless its event was already counted.
    ///
    /// The multiplier scales person XP only; skill XP is awarded as listed.
    pub fn credit(&mut self, completion: &Completion) -> CreditOutcome {
        if self
            .watermarks
            .get(&completion.aggregate_id)
            .is_some_and(|seen| *seen >= completion.sequence)
        {
            return CreditOutcome::AlreadyApplied;
        }

        let earned = self.multiplier.apply(completion.reward.person_xp);
        self.total_xp = self.total_xp.saturating_add(earned);
        self.completed_tasks = self.completed_tasks.saturating_add(1);
        let skill_xp = self.skills.entry(completion.skill.clone()).or_default();
        *skill_xp = skill_xp.saturating_add(completion.reward.skill_xp);
        self.watermarks
            .insert(completion.aggregate_id, completion.sequence);
        self.updated_at = Some(completion.completed_at);
        CreditOutcome::Applied
    }

    /// Returns the multiplier applied to future credits.
    #[must_use]
    pub const fn multiplier(&self) -> XpMultiplier {
        self.multiplier
    }

    /// Sets the multiplier applied to future credits.
    pub const fn set_multiplier(&mut self, multiplier: XpMultiplier) {
        self.multiplier = multiplier;
    }

    /// Returns a copy carrying `multiplier`.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: XpMultiplier) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Returns the revision this state was loaded at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Stamps the revision assigned by a store.
    #[must_use]
    pub const fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Returns the employee.
    #[must_use]
    pub const fn employee(&self) -> EmployeeId {
        self.employee
    }

    /// Returns cumulative XP.
    #[must_use]
    pub const fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// Returns the number of credited completions.
    #[must_use]
    pub const fn completed_tasks(&self) -> u64 {
        self.completed_tasks
    }

    /// Returns cumulative XP per skill.
    #[must_use]
    pub const fn skills(&self) -> &BTreeMap<SkillName, u64> {
        &self.skills
    }

    /// Returns the last credited sequence per aggregate.
    #[must_use]
    pub const fn watermarks(&self) -> &BTreeMap<AggregateId, Version> {
        &self.watermarks
    }

    /// Returns when XP was last credited.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Derives levels from the configured tables.
    #[must_use]
    pub fn summary(&self, config: &ProgressionConfig) -> ProgressionSummary {
        let levels = &config.level_thresholds;
        let skill_levels = &config.skill_thresholds;
        ProgressionSummary {
            employee: self.employee,
            total_xp: self.total_xp,
            level: levels.level_for_xp(self.total_xp),
            missing_xp: levels.missing_xp(self.total_xp),
            completed_tasks: self.completed_tasks,
            skills: self
                .skills
                .iter()
                .map(|(skill, xp)| SkillSummary {
                    skill: skill.clone(),
                    xp: *xp,
                    level: skill_levels.level_for_xp(*xp),
                    missing_xp: skill_levels.missing_xp(*xp),
                })
                .collect(),
        }
    }
}

/// Levels and XP of one employee as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionSummary {
    /// Employee.
    pub employee: EmployeeId,
    /// Cumulative XP.
    pub total_xp: u64,
    /// Level reached.
    pub level: u32,
    /// XP needed for the next level; `0` at the top.
    pub missing_xp: u64,
    /// Number of credited completions.
    pub completed_tasks: u64,
    /// Per-skill levels, ordered by skill name.
    pub skills: Vec<SkillSummary>,
}

/// Level and XP in one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    /// Skill name.
    pub skill: SkillName,
    /// Cumulative XP in the skill.
    pub xp: u64,
    /// Skill level reached.
    pub level: u32,
    /// XP needed for the next skill level.
    pub missing_xp: u64,
}
