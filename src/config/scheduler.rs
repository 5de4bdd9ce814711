//! Background job schedule configuration

use chrono::FixedOffset;
use serde::Deserialize;

use super::error::ValidationError;
use crate::scheduler::CronSchedule;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Cron schedules for the background jobs.
///
/// Expressions are evaluated at `utc_offset_minutes` (Asia/Colombo by
/// default, which has no daylight saving).
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Start the job runner with the server
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Business timezone as minutes east of UTC
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_reminders_cron")]
    pub reminders_cron: String,

    #[serde(default = "default_digest_cron")]
    pub digest_cron: String,

    #[serde(default = "default_milestones_cron")]
    pub milestones_cron: String,
}

impl SchedulerConfig {
    /// Business timezone as a fixed offset.
    pub fn offset(&self) -> Result<FixedOffset, ValidationError> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset(self.utc_offset_minutes));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or(ValidationError::InvalidUtcOffset(self.utc_offset_minutes))
    }

    pub fn reminders(&self) -> Result<CronSchedule, ValidationError> {
        parse_cron("reminders", &self.reminders_cron)
    }

    pub fn digest(&self) -> Result<CronSchedule, ValidationError> {
        parse_cron("digest", &self.digest_cron)
    }

    pub fn milestones(&self) -> Result<CronSchedule, ValidationError> {
        parse_cron("milestones", &self.milestones_cron)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.offset()?;
        self.reminders()?;
        self.digest()?;
        self.milestones()?;
        Ok(())
    }
}

fn parse_cron(job: &'static str, expression: &str) -> Result<CronSchedule, ValidationError> {
    expression.parse().map_err(|e: crate::scheduler::CronError| ValidationError::InvalidCron {
        job,
        reason: e.to_string(),
    })
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            utc_offset_minutes: default_utc_offset_minutes(),
            reminders_cron: default_reminders_cron(),
            digest_cron: default_digest_cron(),
            milestones_cron: default_milestones_cron(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_utc_offset_minutes() -> i32 {
    330
}

fn default_reminders_cron() -> String {
    "*/5 * * * *".to_string()
}

fn default_digest_cron() -> String {
    "0 6 * * *".to_string()
}

fn default_milestones_cron() -> String {
    "0 0 * * *".to_string()
}
