//! Milestone rules and condition evaluation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{MilestoneRuleId, ValidationError};

/// Parsed form of a rule's condition JSON.
///
/// Conditions are stored as free-form JSON tagged by `type`. Types this
/// service does not understand parse to `Unsupported` and never award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MilestoneCondition {
    SessionCount { threshold: u64 },
    #[serde(other)]
    Unsupported,
}

impl MilestoneCondition {
    pub fn from_json(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(MilestoneCondition::Unsupported)
    }

    pub fn is_met(&self, progress: &ChildProgress) -> bool {
        match self {
            MilestoneCondition::SessionCount { threshold } => {
                progress.completed_sessions >= *threshold
            }
            MilestoneCondition::Unsupported => false,
        }
    }
}

/// What is known about a child when rules are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildProgress {
    pub completed_sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRule {
    pub id: MilestoneRuleId,
    pub name: String,
    /// Raw condition as stored.
    pub condition: Value,
    pub reward_type: String,
    pub is_active: bool,
}

impl MilestoneRule {
    pub fn new(
        name: impl Into<String>,
        condition: Value,
        reward_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            id: MilestoneRuleId::new(),
            name,
            condition,
            reward_type: reward_type.into(),
            is_active: true,
        })
    }

    pub fn parsed_condition(&self) -> MilestoneCondition {
        MilestoneCondition::from_json(&self.condition)
    }

    pub fn is_met_by(&self, progress: &ChildProgress) -> bool {
        self.is_active && self.parsed_condition().is_met(progress)
    }
}
