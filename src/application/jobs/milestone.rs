//! Milestone evaluation job.
//!
//! Walks every (child, active rule) pair that has no award yet, evaluates
//! the rule against the child's progress and grants the award, logs it to
//! the CRM and congratulates the parent.

use async_trait::async_trait;
use chrono::FixedOffset;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::crm::CrmEvent;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::milestone::{ChildProgress, MilestoneAward, MilestoneRule};
use crate::domain::notification::milestone_congratulations;
use crate::domain::people::Child;
use crate::ports::{
    ChildRepository, CrmEventRepository, Mailer, MilestoneRepository, SessionRepository,
    UserRepository,
};

use super::{JobError, JobReport, ScheduledJob};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneReport {
    /// (child, rule) pairs checked this run.
    pub evaluated: u32,
    pub awarded: u32,
}

pub struct MilestoneJob {
    children: Arc<dyn ChildRepository>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    milestones: Arc<dyn MilestoneRepository>,
    crm: Arc<dyn CrmEventRepository>,
    mailer: Arc<dyn Mailer>,
    offset: FixedOffset,
}

impl MilestoneJob {
    pub fn new(
        children: Arc<dyn ChildRepository>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        milestones: Arc<dyn MilestoneRepository>,
        crm: Arc<dyn CrmEventRepository>,
        mailer: Arc<dyn Mailer>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            children,
            users,
            sessions,
            milestones,
            crm,
            mailer,
            offset,
        }
    }

    pub async fn execute(&self, now: Timestamp) -> Result<MilestoneReport, JobError> {
        let mut report = MilestoneReport::default();

        let rules = self.milestones.list_active_rules().await?;
        if rules.is_empty() {
            tracing::debug!("No active milestone rules");
            return Ok(report);
        }
        let children = self.children.list_all().await?;

        for child in &children {
            if let Err(e) = self.evaluate_child(child, &rules, now, &mut report).await {
                tracing::error!(child_id = %child.id, error = %e, "Milestone evaluation failed");
            }
        }

        tracing::info!(
            evaluated = report.evaluated,
            awarded = report.awarded,
            "Milestone job finished"
        );
        Ok(report)
    }

    async fn evaluate_child(
        &self,
        child: &Child,
        rules: &[MilestoneRule],
        now: Timestamp,
        report: &mut MilestoneReport,
    ) -> Result<(), DomainError> {
        let mut cached: Option<ChildProgress> = None;

        for rule in rules {
            if self.milestones.award_exists(&child.id, &rule.id).await? {
                continue;
            }
            report.evaluated += 1;

            if cached.is_none() {
                cached = Some(ChildProgress {
                    completed_sessions: self.sessions.count_completed_for_child(&child.id).await?,
                });
            }
            let progress = cached.unwrap_or_default();
            if !rule.is_met_by(&progress) {
                continue;
            }

            let award = MilestoneAward::grant(child.id, rule.id, now);
            if !self.milestones.insert_award(&award).await? {
                continue;
            }
            report.awarded += 1;

            tracing::info!(
                child_id = %child.id,
                rule_id = %rule.id,
                milestone = %rule.name,
                "Milestone awarded"
            );

            // The award is stored; follow-ups must not abort the child's
            // remaining rules.
            let event = CrmEvent::milestone_awarded(*child.id.as_uuid(), &rule.name, &child.name, now);
            if let Err(e) = self.crm.append(&event).await {
                tracing::error!(
                    child_id = %child.id,
                    rule_id = %rule.id,
                    error = %e,
                    "Failed to log milestone CRM event"
                );
            }
            if let Err(e) = self.congratulate(child, rule, &award).await {
                tracing::error!(child_id = %child.id, error = %e, "Milestone email skipped");
            }
        }
        Ok(())
    }

    async fn congratulate(
        &self,
        child: &Child,
        rule: &MilestoneRule,
        award: &MilestoneAward,
    ) -> Result<(), DomainError> {
        let Some(parent) = self.users.find_by_id(&child.parent_id).await? else {
            tracing::warn!(child_id = %child.id, "Parent not found for milestone email");
            return Ok(());
        };
        let message = milestone_congratulations(
            &parent.email,
            &child.name,
            &rule.name,
            award.awarded_at,
            self.offset,
        );
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(to = %parent.email, error = %e, "Milestone email failed");
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduledJob for MilestoneJob {
    fn name(&self) -> &'static str {
        "milestones"
    }

    async fn run(&self, now: Timestamp) -> Result<JobReport, JobError> {
        self.execute(now).await.map(JobReport::Milestones)
    }
}
