//! Catalog entries describing tasks employees can pick up.

use super::{
    TaskId, TaskValidationError,
    error::{MAX_TEXT_LENGTH, MAX_TITLE_LENGTH, bounded_text, required_text},
};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! label_type {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a validated label.
            ///
            /// # Errors
            ///
            /// Returns [`TaskValidationError`] when the value is empty after
            /// trimming or longer than 255 characters.
            pub fn new(value: impl AsRef<str>) -> Result<Self, TaskValidationError> {
                required_text($field, value.as_ref(), MAX_TITLE_LENGTH).map(Self)
            }

            /// Returns the label as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TaskValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

label_type!(
    /// Department that owns a catalog task; used to group read models.
    DepartmentName,
    "department"
);

label_type!(
    /// Skill that completing a task trains.
    SkillName,
    "skill"
);

/// Experience awarded when a task completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskReward {
    /// XP credited to the employee's overall total.
    pub person_xp: u64,
    /// XP credited to the task's skill.
    pub skill_xp: u64,
}

impl TaskReward {
    /// Creates a reward.
    #[must_use]
    pub const fn new(person_xp: u64, skill_xp: u64) -> Self {
        Self {
            person_xp,
            skill_xp,
        }
    }
}

/// A task definition that can be assigned to employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTask {
    id: TaskId,
    title: String,
    description: String,
    department: DepartmentName,
    skill: SkillName,
    requires_approval: bool,
    reward: TaskReward,
    is_active: bool,
}

impl CatalogTask {
    /// Creates an active catalog task with no reward and no approval step.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError`] when the title is empty or too long.
    pub fn new(
        title: impl AsRef<str>,
        department: DepartmentName,
        skill: SkillName,
    ) -> Result<Self, TaskValidationError> {
        Ok(Self {
            id: TaskId::new(),
            title: required_text("title", title.as_ref(), MAX_TITLE_LENGTH)?,
            description: String::new(),
            department,
            skill,
            requires_approval: false,
            reward: TaskReward::default(),
            is_active: true,
        })
    }

    /// Replaces the generated identifier, e.g. when loading from storage.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    /// Sets the description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::FieldTooLong`] above 500 characters.
    pub fn with_description(
        mut self,
        description: impl AsRef<str>,
    ) -> Result<Self, TaskValidationError> {
        self.description = bounded_text("description", description.as_ref(), MAX_TEXT_LENGTH)?;
        Ok(self)
    }

    /// Sets whether completion needs a separate approval.
    #[must_use]
    pub const fn with_requires_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = requires_approval;
        self
    }

    /// Sets the completion reward.
    #[must_use]
    pub const fn with_reward(mut self, reward: TaskReward) -> Self {
        self.reward = reward;
        self
    }

    /// Marks the entry active or retired.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns the catalog identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the owning department.
    #[must_use]
    pub const fn department(&self) -> &DepartmentName {
        &self.department
    }

    /// Returns the trained skill.
    #[must_use]
    pub const fn skill(&self) -> &SkillName {
        &self.skill
    }

    /// Returns whether completion needs approval by default.
    #[must_use]
    pub const fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    /// Returns the completion reward.
    #[must_use]
    pub const fn reward(&self) -> TaskReward {
        self.reward
    }

    /// Returns whether the entry is offered to employees.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }
}
