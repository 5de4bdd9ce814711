//! Data transfer objects for session endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChildId, LocationId, SessionId, Timestamp, UserId};
use crate::domain::session::{Conflict, ReminderKind, Session, SessionStatus, SessionType};

/// Request body for booking a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub session_type: SessionType,
    pub coach_id: UserId,
    pub child_ids: Vec<ChildId>,
    pub location_id: LocationId,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
}

/// Request body for a conflict dry-run.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckConflictsRequest {
    pub coach_id: UserId,
    #[serde(default)]
    pub child_ids: Vec<ChildId>,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    /// Session being moved, ignored by the check.
    pub exclude_session_id: Option<SessionId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictCheckResponse {
    pub has_conflicts: bool,
    pub conflicts: Vec<Conflict>,
    pub messages: Vec<String>,
}

impl From<Vec<Conflict>> for ConflictCheckResponse {
    fn from(conflicts: Vec<Conflict>) -> Self {
        Self {
            has_conflicts: !conflicts.is_empty(),
            messages: conflicts.iter().map(Conflict::message).collect(),
            conflicts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub session_type: SessionType,
    pub coach_id: UserId,
    pub child_ids: Vec<ChildId>,
    pub location_id: LocationId,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub status: SessionStatus,
    pub reminders_sent: Vec<ReminderKind>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: *session.id(),
            session_type: session.session_type(),
            coach_id: *session.coach_id(),
            child_ids: session.child_ids().to_vec(),
            location_id: *session.location_id(),
            start_at: session.start_at(),
            end_at: session.end_at(),
            status: session.status(),
            reminders_sent: session.reminders_sent().iter().copied().collect(),
        }
    }
}
