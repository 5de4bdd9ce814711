use async_trait::async_trait;

use crate::domain::foundation::{ChildId, DomainError, MilestoneRuleId, Timestamp};
use crate::domain::milestone::{MilestoneAward, MilestoneRule};

/// Milestone rules and the awards granted from them.
#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    async fn save_rule(&self, rule: &MilestoneRule) -> Result<(), DomainError>;

    async fn list_active_rules(&self) -> Result<Vec<MilestoneRule>, DomainError>;

    async fn award_exists(
        &self,
        child_id: &ChildId,
        rule_id: &MilestoneRuleId,
    ) -> Result<bool, DomainError>;

    /// Stores an award. Returns `false` without error if the child already
    /// holds an award for the rule.
    async fn insert_award(&self, award: &MilestoneAward) -> Result<bool, DomainError>;

    async fn find_awards_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<MilestoneAward>, DomainError>;
}
