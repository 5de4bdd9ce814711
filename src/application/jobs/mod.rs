//! Scheduled background jobs.
//!
//! Every job takes the current instant as an argument so runs are
//! reproducible under test. The scheduler passes the wall clock; the HTTP
//! surface can trigger a run on demand.
//!
//! Jobs are idempotent: re-running never sends a second reminder for the
//! same threshold nor grants a second award for the same rule. A failure on
//! one session or child is logged and the run continues.

mod digest;
mod error;
mod milestone;
mod reminder;

pub use digest::{DailyDigestJob, DigestReport};
pub use error::JobError;
pub use milestone::{MilestoneJob, MilestoneReport};
pub use reminder::{ReminderJob, ReminderReport, REMINDER_WINDOW_MINUTES};

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Outcome of one job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobReport {
    Reminders(ReminderReport),
    Digest(DigestReport),
    Milestones(MilestoneReport),
}

/// A job the scheduler can run on a cron schedule.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Stable name used in logs and configuration.
    fn name(&self) -> &'static str;

    async fn run(&self, now: Timestamp) -> Result<JobReport, JobError>;
}
