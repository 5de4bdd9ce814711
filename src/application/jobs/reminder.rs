//! Session reminder job.
//!
//! Each tick looks for booked sessions starting roughly 24 hours and 1 hour
//! from now and emails the parents of every child in them. A reminder is
//! claimed on the session before any email goes out, so overlapping ticks
//! never double-send; if every email for a session fails the claim is
//! released and the next tick retries.

use async_trait::async_trait;
use chrono::{Duration, FixedOffset};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::notification::{session_reminder, ReminderDetails};
use crate::domain::people::Child;
use crate::domain::session::{ReminderKind, Session};
use crate::ports::{ChildRepository, LocationRepository, Mailer, SessionRepository, UserRepository};

use super::{JobError, JobReport, ScheduledJob};

/// Half-width of the start-time window around each threshold.
pub const REMINDER_WINDOW_MINUTES: i64 = 5;

const FALLBACK_CHILD: &str = "Child";
const FALLBACK_LOCATION: &str = "Location";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    /// Emails delivered for the 24 hour threshold.
    pub sent_24h: u32,
    /// Emails delivered for the 1 hour threshold.
    pub sent_1h: u32,
    /// Sessions already reminded, or with nobody to remind.
    pub skipped: u32,
    /// Sessions whose reminder could not be delivered this tick.
    pub failed: u32,
}

impl ReminderReport {
    fn add_sent(&mut self, kind: ReminderKind, count: u32) {
        match kind {
            ReminderKind::DayBefore => self.sent_24h += count,
            ReminderKind::HourBefore => self.sent_1h += count,
        }
    }
}

enum Outcome {
    Sent(u32),
    Skipped,
    Failed,
}

pub struct ReminderJob {
    sessions: Arc<dyn SessionRepository>,
    children: Arc<dyn ChildRepository>,
    users: Arc<dyn UserRepository>,
    locations: Arc<dyn LocationRepository>,
    mailer: Arc<dyn Mailer>,
    offset: FixedOffset,
}

impl ReminderJob {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        children: Arc<dyn ChildRepository>,
        users: Arc<dyn UserRepository>,
        locations: Arc<dyn LocationRepository>,
        mailer: Arc<dyn Mailer>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            sessions,
            children,
            users,
            locations,
            mailer,
            offset,
        }
    }

    pub async fn execute(&self, now: Timestamp) -> Result<ReminderReport, JobError> {
        let mut report = ReminderReport::default();
        let window = Duration::minutes(REMINDER_WINDOW_MINUTES);

        for kind in ReminderKind::ALL {
            let target = now.plus(kind.lead_time());
            let due = self
                .sessions
                .find_booked_starting_between(&target.minus(window), &target.plus(window))
                .await?;

            for session in &due {
                if session.has_sent(kind) {
                    report.skipped += 1;
                    continue;
                }
                match self.remind(session, kind).await {
                    Ok(Outcome::Sent(count)) => report.add_sent(kind, count),
                    Ok(Outcome::Skipped) => report.skipped += 1,
                    Ok(Outcome::Failed) => report.failed += 1,
                    Err(e) => {
                        tracing::error!(
                            session_id = %session.id(),
                            reminder = %kind,
                            error = %e,
                            "Reminder failed"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            sent_24h = report.sent_24h,
            sent_1h = report.sent_1h,
            skipped = report.skipped,
            failed = report.failed,
            "Reminder job finished"
        );
        Ok(report)
    }

    async fn remind(&self, session: &Session, kind: ReminderKind) -> Result<Outcome, DomainError> {
        if !self.sessions.claim_reminder(session.id(), kind).await? {
            return Ok(Outcome::Skipped);
        }

        // Until one email is out, any failure hands the claim back.
        match self.deliver(session, kind).await {
            Ok(Outcome::Failed) => {
                self.sessions.release_reminder(session.id(), kind).await?;
                Ok(Outcome::Failed)
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(release_err) = self.sessions.release_reminder(session.id(), kind).await {
                    tracing::error!(
                        session_id = %session.id(),
                        reminder = %kind,
                        error = %release_err,
                        "Could not release reminder claim"
                    );
                }
                Err(e)
            }
        }
    }

    async fn deliver(&self, session: &Session, kind: ReminderKind) -> Result<Outcome, DomainError> {
        let children = self.children.find_by_ids(session.child_ids()).await?;
        let location = match self.locations.find_by_id(session.location_id()).await? {
            Some(location) => location.label,
            None => FALLBACK_LOCATION.to_string(),
        };

        let mut attempted = 0u32;
        let mut delivered = 0u32;
        for (parent_id, child_name) in parents_with_first_child(session, &children) {
            let Some(parent) = self.users.find_by_id(&parent_id).await? else {
                tracing::warn!(session_id = %session.id(), parent_id = %parent_id, "Parent not found");
                continue;
            };

            attempted += 1;
            let message = session_reminder(
                &parent.email,
                &ReminderDetails {
                    child_name,
                    start_at: session.start_at(),
                    location: location.clone(),
                    kind,
                },
                self.offset,
            );
            match self.mailer.send(&message).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    session_id = %session.id(),
                    to = %parent.email,
                    error = %e,
                    "Reminder email failed"
                ),
            }
        }

        if attempted == 0 {
            tracing::warn!(session_id = %session.id(), reminder = %kind, "No parent to remind");
            return Ok(Outcome::Skipped);
        }
        if delivered == 0 {
            return Ok(Outcome::Failed);
        }
        Ok(Outcome::Sent(delivered))
    }
}

/// Distinct parents of the session's children, each paired with the name of
/// their first child in session order.
fn parents_with_first_child(session: &Session, children: &[Child]) -> Vec<(UserId, String)> {
    let mut parents: Vec<(UserId, String)> = Vec::new();
    for child_id in session.child_ids() {
        let Some(child) = children.iter().find(|c| &c.id == child_id) else {
            continue;
        };
        if !parents.iter().any(|(id, _)| id == &child.parent_id) {
            let name = if child.name.is_empty() {
                FALLBACK_CHILD.to_string()
            } else {
                child.name.clone()
            };
            parents.push((child.parent_id, name));
        }
    }
    parents
}

#[async_trait]
impl ScheduledJob for ReminderJob {
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn run(&self, now: Timestamp) -> Result<JobReport, JobError> {
        self.execute(now).await.map(JobReport::Reminders)
    }
}
