//! ScheduleRequest aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, RequestId, SessionId, Timestamp, UserId, ValidationError,
};
use crate::domain::session::Session;

/// Requests filed with less notice than this are flagged late.
pub const LATE_REQUEST_WINDOW_HOURS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Reschedule,
    Cancel,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Reschedule => "reschedule",
            RequestType::Cancel => "cancel",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reschedule" => Ok(RequestType::Reschedule),
            "cancel" => Ok(RequestType::Cancel),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown request type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown request status '{}'", other),
            )),
        }
    }
}

/// A parent's request to move or cancel a booked session.
///
/// Decisions are one-shot: once approved or rejected the request is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub id: RequestId,
    pub request_type: RequestType,
    pub session_id: SessionId,
    pub requester_id: UserId,
    pub reason: String,
    pub is_late: bool,
    pub status: RequestStatus,
    pub admin_note: Option<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ScheduleRequest {
    /// Files a request against `session`, flagging it late when the session
    /// starts within [`LATE_REQUEST_WINDOW_HOURS`] of `now`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the reason is blank
    /// - `InvalidStateTransition` if the session is no longer booked
    pub fn submit(
        request_type: RequestType,
        session: &Session,
        requester_id: UserId,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let reason = reason.into().trim().to_string();
        if reason.is_empty() {
            return Err(ValidationError::empty_field("reason").into());
        }
        if !session.is_booked() {
            return Err(DomainError::invalid_state(format!(
                "Cannot {} a {} session",
                request_type,
                session.status()
            )));
        }

        Ok(Self {
            id: RequestId::new(),
            request_type,
            session_id: *session.id(),
            requester_id,
            reason,
            is_late: Self::is_late_for(session, &now),
            status: RequestStatus::Pending,
            admin_note: None,
            decided_at: None,
            created_at: now,
        })
    }

    /// Whether a request filed at `now` counts as late for `session`.
    pub fn is_late_for(session: &Session, now: &Timestamp) -> bool {
        session.hours_until_start(now) < LATE_REQUEST_WINDOW_HOURS
    }

    /// # Errors
    ///
    /// - `InvalidStateTransition` unless pending
    pub fn approve(&mut self, note: Option<String>, now: Timestamp) -> Result<(), DomainError> {
        self.decide(RequestStatus::Approved, note, now)
    }

    /// Rejects the request, recording `reason` as the admin note.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless pending
    pub fn reject(&mut self, reason: impl Into<String>, now: Timestamp) -> Result<(), DomainError> {
        self.decide(RequestStatus::Rejected, Some(reason.into()), now)
    }

    fn decide(
        &mut self,
        outcome: RequestStatus,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if !self.status.is_pending() {
            return Err(DomainError::invalid_state(format!(
                "Request {} is already {}",
                self.id, self.status
            )));
        }
        self.status = outcome;
        self.admin_note = note;
        self.decided_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChildId, ErrorCode, LocationId};
    use crate::domain::session::{SessionType, TimeSlot};

    fn session_starting_in(now: Timestamp, minutes: i64) -> Session {
        let start = now.plus_minutes(minutes);
        Session::book(
            SessionType::Individual,
            UserId::new(),
            vec![ChildId::new()],
            LocationId::new(),
            TimeSlot::new(start, start.plus_hours(1)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn request_inside_twelve_hours_is_late() {
        let now = Timestamp::now();
        let session = session_starting_in(now, 11 * 60 + 59);
        let request =
            ScheduleRequest::submit(RequestType::Cancel, &session, UserId::new(), "sick", now)
                .unwrap();
        assert!(request.is_late);
        assert!(request.status.is_pending());
    }

    #[test]
    fn request_at_exactly_twelve_hours_is_on_time() {
        let now = Timestamp::now();
        let session = session_starting_in(now, 12 * 60);
        assert!(!ScheduleRequest::is_late_for(&session, &now));
    }

    #[test]
    fn blank_reason_is_rejected() {
        let now = Timestamp::now();
        let session = session_starting_in(now, 48 * 60);
        let err = ScheduleRequest::submit(RequestType::Cancel, &session, UserId::new(), "  ", now)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn canceled_session_cannot_receive_requests() {
        let now = Timestamp::now();
        let mut session = session_starting_in(now, 48 * 60);
        session.cancel().unwrap();
        let err =
            ScheduleRequest::submit(RequestType::Reschedule, &session, UserId::new(), "trip", now)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn reject_records_reason_and_freezes_request() {
        let now = Timestamp::now();
        let session = session_starting_in(now, 48 * 60);
        let mut request =
            ScheduleRequest::submit(RequestType::Cancel, &session, UserId::new(), "trip", now)
                .unwrap();

        request.reject("too late", now).unwrap();

        assert_eq!(request.status, RequestStatus::Rejected);
        assert_eq!(request.admin_note.as_deref(), Some("too late"));
        assert_eq!(request.decided_at, Some(now));
        assert!(request.approve(None, now).is_err());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [RequestStatus::Pending, RequestStatus::Approved, RequestStatus::Rejected] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
    }
}
