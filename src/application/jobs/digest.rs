//! Daily digest job.
//!
//! Once a day every admin and coach receives the list of booked sessions for
//! the current business-local day. Admin digests also list every pending
//! request.

use async_trait::async_trait;
use chrono::FixedOffset;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, SessionId, Timestamp, UserId};
use crate::domain::notification::{daily_digest, DigestRequestLine, DigestSessionLine};
use crate::domain::people::UserRole;
use crate::domain::request::ScheduleRequest;
use crate::domain::session::Session;
use crate::ports::{
    ChildRepository, LocationRepository, Mailer, RequestRepository, SessionRepository,
    UserRepository,
};

use super::{JobError, JobReport, ScheduledJob};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DigestReport {
    pub sessions: u32,
    pub pending_requests: u32,
    pub recipients: u32,
    pub sent: u32,
    pub failed: u32,
}

pub struct DailyDigestJob {
    sessions: Arc<dyn SessionRepository>,
    requests: Arc<dyn RequestRepository>,
    users: Arc<dyn UserRepository>,
    children: Arc<dyn ChildRepository>,
    locations: Arc<dyn LocationRepository>,
    mailer: Arc<dyn Mailer>,
    offset: FixedOffset,
}

impl DailyDigestJob {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        requests: Arc<dyn RequestRepository>,
        users: Arc<dyn UserRepository>,
        children: Arc<dyn ChildRepository>,
        locations: Arc<dyn LocationRepository>,
        mailer: Arc<dyn Mailer>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            sessions,
            requests,
            users,
            children,
            locations,
            mailer,
            offset,
        }
    }

    pub async fn execute(&self, now: Timestamp) -> Result<DigestReport, JobError> {
        let (day_start, day_end) = now.local_day_bounds(self.offset);
        let todays: Vec<Session> = self
            .sessions
            .find_booked_starting_between(&day_start, &day_end)
            .await?
            .into_iter()
            .filter(|s| s.start_at().is_before(&day_end))
            .collect();
        let pending = self.requests.list_pending().await?;

        let session_lines = self.session_lines(&todays).await?;
        let request_lines = self.request_lines(&pending).await?;

        let recipients = self
            .users
            .list_by_roles(&[UserRole::Admin, UserRole::Coach])
            .await?;

        let mut report = DigestReport {
            sessions: todays.len() as u32,
            pending_requests: pending.len() as u32,
            recipients: recipients.len() as u32,
            ..DigestReport::default()
        };

        for user in &recipients {
            let message = daily_digest(
                &user.email,
                user.role,
                now,
                self.offset,
                &session_lines,
                &request_lines,
            );
            match self.mailer.send(&message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::warn!(to = %user.email, error = %e, "Daily digest email failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            sessions = report.sessions,
            pending_requests = report.pending_requests,
            sent = report.sent,
            failed = report.failed,
            "Daily digest finished"
        );
        Ok(report)
    }

    async fn session_lines(&self, sessions: &[Session]) -> Result<Vec<DigestSessionLine>, DomainError> {
        let mut lines = Vec::with_capacity(sessions.len());
        for session in sessions {
            let names: Vec<String> = self
                .children
                .find_by_ids(session.child_ids())
                .await?
                .into_iter()
                .map(|c| c.name)
                .collect();
            let location = self
                .locations
                .find_by_id(session.location_id())
                .await?
                .map(|l| l.label)
                .unwrap_or_else(|| "Location".to_string());

            lines.push(DigestSessionLine {
                time: session.start_at().in_offset(self.offset).format("%H:%M").to_string(),
                children: names.join(", "),
                location,
            });
        }
        Ok(lines)
    }

    async fn request_lines(&self, requests: &[ScheduleRequest]) -> Result<Vec<DigestRequestLine>, DomainError> {
        let mut session_dates: HashMap<SessionId, String> = HashMap::new();
        let mut requester_names: HashMap<UserId, String> = HashMap::new();
        let mut lines = Vec::with_capacity(requests.len());

        for request in requests {
            if !session_dates.contains_key(&request.session_id) {
                let date = self
                    .sessions
                    .find_by_id(&request.session_id)
                    .await?
                    .map(|s| s.start_at().in_offset(self.offset).format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "unknown session".to_string());
                session_dates.insert(request.session_id, date);
            }
            if !requester_names.contains_key(&request.requester_id) {
                let name = self
                    .users
                    .find_by_id(&request.requester_id)
                    .await?
                    .map(|u| u.name)
                    .unwrap_or_else(|| "Unknown".to_string());
                requester_names.insert(request.requester_id, name);
            }

            lines.push(DigestRequestLine {
                request_type: request.request_type.to_string(),
                session_date: session_dates[&request.session_id].clone(),
                requester: requester_names[&request.requester_id].clone(),
            });
        }
        Ok(lines)
    }
}

#[async_trait]
impl ScheduledJob for DailyDigestJob {
    fn name(&self) -> &'static str {
        "digest"
    }

    async fn run(&self, now: Timestamp) -> Result<JobReport, JobError> {
        self.execute(now).await.map(JobReport::Digest)
    }
}
