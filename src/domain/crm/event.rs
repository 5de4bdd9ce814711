use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{CrmEventId, Timestamp, UserId, ValidationError};
use crate::domain::request::ScheduleRequest;
use crate::domain::session::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmEventKind {
    SessionRescheduled,
    SessionCanceled,
    RequestRejected,
    MilestoneAwarded,
}

impl CrmEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrmEventKind::SessionRescheduled => "session_rescheduled",
            CrmEventKind::SessionCanceled => "session_canceled",
            CrmEventKind::RequestRejected => "request_rejected",
            CrmEventKind::MilestoneAwarded => "milestone_awarded",
        }
    }
}

impl fmt::Display for CrmEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrmEventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session_rescheduled" => Ok(CrmEventKind::SessionRescheduled),
            "session_canceled" => Ok(CrmEventKind::SessionCanceled),
            "request_rejected" => Ok(CrmEventKind::RequestRejected),
            "milestone_awarded" => Ok(CrmEventKind::MilestoneAwarded),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown CRM event kind '{}'", other),
            )),
        }
    }
}

/// One entry in the CRM log.
///
/// `subject_id` is the session for schedule events and the child for awards,
/// so it is kept as a raw UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmEvent {
    pub id: CrmEventId,
    pub actor_id: UserId,
    pub subject_id: Uuid,
    pub kind: CrmEventKind,
    pub payload: Value,
    pub created_at: Timestamp,
}

impl CrmEvent {
    pub fn new(
        actor_id: UserId,
        subject_id: Uuid,
        kind: CrmEventKind,
        payload: Value,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: CrmEventId::new(),
            actor_id,
            subject_id,
            kind,
            payload,
            created_at,
        }
    }

    /// An admin approved a reschedule and the session moved.
    pub fn session_rescheduled(
        admin: UserId,
        request: &ScheduleRequest,
        old: &TimeSlot,
        new: &TimeSlot,
        now: Timestamp,
    ) -> Self {
        Self::new(
            admin,
            *request.session_id.as_uuid(),
            CrmEventKind::SessionRescheduled,
            json!({
                "oldStartAt": old.start_at(),
                "oldEndAt": old.end_at(),
                "newStartAt": new.start_at(),
                "newEndAt": new.end_at(),
                "reason": request.reason,
            }),
            now,
        )
    }

    /// An admin approved a cancellation.
    pub fn session_canceled(admin: UserId, request: &ScheduleRequest, now: Timestamp) -> Self {
        Self::new(
            admin,
            *request.session_id.as_uuid(),
            CrmEventKind::SessionCanceled,
            json!({
                "reason": request.reason,
                "isLate": request.is_late,
            }),
            now,
        )
    }

    pub fn request_rejected(
        admin: UserId,
        request: &ScheduleRequest,
        admin_reason: &str,
        now: Timestamp,
    ) -> Self {
        Self::new(
            admin,
            *request.session_id.as_uuid(),
            CrmEventKind::RequestRejected,
            json!({
                "requestType": request.request_type,
                "reason": request.reason,
                "adminReason": admin_reason,
                "isLate": request.is_late,
            }),
            now,
        )
    }

    /// Logged by the milestone job under the system actor.
    pub fn milestone_awarded(
        child_id: Uuid,
        milestone_name: &str,
        child_name: &str,
        awarded_at: Timestamp,
    ) -> Self {
        Self::new(
            UserId::system(),
            child_id,
            CrmEventKind::MilestoneAwarded,
            json!({
                "milestoneName": milestone_name,
                "childName": child_name,
                "awardedAt": awarded_at,
            }),
            awarded_at,
        )
    }
}
