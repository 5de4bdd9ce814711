use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChildId, MilestoneAwardId, MilestoneRuleId, Timestamp};

/// A milestone a child has earned. Storage keeps at most one award per
/// (child, rule) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneAward {
    pub id: MilestoneAwardId,
    pub child_id: ChildId,
    pub rule_id: MilestoneRuleId,
    pub awarded_at: Timestamp,
    pub artifact_url: String,
}

impl MilestoneAward {
    pub fn grant(child_id: ChildId, rule_id: MilestoneRuleId, awarded_at: Timestamp) -> Self {
        Self {
            id: MilestoneAwardId::new(),
            child_id,
            rule_id,
            awarded_at,
            artifact_url: Self::certificate_path(&child_id, &rule_id),
        }
    }

    /// Path of the generated certificate for a (child, rule) pair.
    pub fn certificate_path(child_id: &ChildId, rule_id: &MilestoneRuleId) -> String {
        format!("/certificates/{}-{}.pdf", child_id, rule_id)
    }
}
