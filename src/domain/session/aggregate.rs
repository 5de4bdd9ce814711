//! Session aggregate entity.
//!
//! Sessions reference their coach, children and location by ID only.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    ChildId, DomainError, LocationId, SessionId, Timestamp, UserId, ValidationError,
};

use super::SessionStatus;

/// Whether a session trains one child or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Individual,
    Group,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Individual => "individual",
            SessionType::Group => "group",
        }
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(SessionType::Individual),
            "group" => Ok(SessionType::Group),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown session type '{}'", other),
            )),
        }
    }
}

/// Reminder thresholds sent ahead of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReminderKind {
    #[serde(rename = "24h")]
    DayBefore,
    #[serde(rename = "1h")]
    HourBefore,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::DayBefore, ReminderKind::HourBefore];

    /// How long before the session start this reminder targets.
    pub fn lead_time(&self) -> Duration {
        match self {
            ReminderKind::DayBefore => Duration::hours(24),
            ReminderKind::HourBefore => Duration::hours(1),
        }
    }

    /// Storage and wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "24h",
            ReminderKind::HourBefore => "1h",
        }
    }

    /// Human wording used in email subjects.
    pub fn notice_label(&self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "24 Hours",
            ReminderKind::HourBefore => "1 Hour",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(ReminderKind::DayBefore),
            "1h" => Ok(ReminderKind::HourBefore),
            other => Err(ValidationError::invalid_format(
                "reminders_sent",
                format!("unknown reminder '{}'", other),
            )),
        }
    }
}

/// Half-open time interval `[start_at, end_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start_at: Timestamp,
    end_at: Timestamp,
}

impl TimeSlot {
    /// # Errors
    ///
    /// - `InvalidFormat` unless `start_at` is strictly before `end_at`
    pub fn new(start_at: Timestamp, end_at: Timestamp) -> Result<Self, ValidationError> {
        if !start_at.is_before(&end_at) {
            return Err(ValidationError::invalid_format(
                "end_at",
                "session must end after it starts",
            ));
        }
        Ok(Self { start_at, end_at })
    }

    pub fn start_at(&self) -> Timestamp {
        self.start_at
    }

    pub fn end_at(&self) -> Timestamp {
        self.end_at
    }

    pub fn duration(&self) -> Duration {
        self.end_at.duration_since(&self.start_at)
    }

    /// Two slots overlap when each starts before the other ends.
    /// Back-to-back slots do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_at.is_before(&other.end_at) && self.end_at.is_after(&other.start_at)
    }
}

/// Session aggregate - one booked coaching slot.
///
/// # Invariants
///
/// - `slot.start_at < slot.end_at`
/// - `child_ids` is non-empty and has no duplicates
/// - individual sessions have exactly one child
/// - only booked sessions can be moved, canceled or completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    session_type: SessionType,
    coach_id: UserId,
    child_ids: Vec<ChildId>,
    location_id: LocationId,
    slot: TimeSlot,
    status: SessionStatus,
    reminders_sent: BTreeSet<ReminderKind>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Books a new session.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the child list is empty, has duplicates, or
    ///   does not match the session type
    pub fn book(
        session_type: SessionType,
        coach_id: UserId,
        child_ids: Vec<ChildId>,
        location_id: LocationId,
        slot: TimeSlot,
    ) -> Result<Self, DomainError> {
        Self::validate_children(session_type, &child_ids)?;

        let now = Timestamp::now();
        Ok(Self {
            id: SessionId::new(),
            session_type,
            coach_id,
            child_ids,
            location_id,
            slot,
            status: SessionStatus::Booked,
            reminders_sent: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        session_type: SessionType,
        coach_id: UserId,
        child_ids: Vec<ChildId>,
        location_id: LocationId,
        slot: TimeSlot,
        status: SessionStatus,
        reminders_sent: BTreeSet<ReminderKind>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_type,
            coach_id,
            child_ids,
            location_id,
            slot,
            status,
            reminders_sent,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn coach_id(&self) -> &UserId {
        &self.coach_id
    }

    pub fn child_ids(&self) -> &[ChildId] {
        &self.child_ids
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    pub fn start_at(&self) -> Timestamp {
        self.slot.start_at()
    }

    pub fn end_at(&self) -> Timestamp {
        self.slot.end_at()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn reminders_sent(&self) -> &BTreeSet<ReminderKind> {
        &self.reminders_sent
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_booked(&self) -> bool {
        self.status.is_booked()
    }

    pub fn involves_child(&self, child_id: &ChildId) -> bool {
        self.child_ids.contains(child_id)
    }

    pub fn has_sent(&self, kind: ReminderKind) -> bool {
        self.reminders_sent.contains(&kind)
    }

    /// Hours (fractional) between `now` and the session start. Negative once
    /// the session has started.
    pub fn hours_until_start(&self, now: &Timestamp) -> f64 {
        self.start_at().duration_since(now).num_seconds() as f64 / 3600.0
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Moves the session to a new slot and returns the old one.
    ///
    /// Reminders already sent refer to the old start time, so they are reset.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the session is booked
    pub fn reschedule(&mut self, slot: TimeSlot) -> Result<TimeSlot, DomainError> {
        self.ensure_booked("reschedule")?;
        let old = std::mem::replace(&mut self.slot, slot);
        self.reminders_sent.clear();
        self.updated_at = Timestamp::now();
        Ok(old)
    }

    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the session is booked
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(SessionStatus::Canceled)
    }

    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the session is booked
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition_to(SessionStatus::Completed)
    }

    /// Records that a reminder went out. Returns false if it was already
    /// recorded.
    pub fn record_reminder(&mut self, kind: ReminderKind) -> bool {
        let inserted = self.reminders_sent.insert(kind);
        if inserted {
            self.updated_at = Timestamp::now();
        }
        inserted
    }

    /// Forgets a reminder so it can be sent again.
    pub fn forget_reminder(&mut self, kind: ReminderKind) -> bool {
        self.reminders_sent.remove(&kind)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn transition_to(&mut self, target: SessionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&target) {
            return Err(DomainError::invalid_state(format!(
                "Cannot move session from {} to {}",
                self.status, target
            )));
        }
        self.status = target;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn ensure_booked(&self, action: &str) -> Result<(), DomainError> {
        if self.is_booked() {
            Ok(())
        } else {
            Err(DomainError::invalid_state(format!(
                "Cannot {} a {} session",
                action, self.status
            )))
        }
    }

    fn validate_children(session_type: SessionType, child_ids: &[ChildId]) -> Result<(), DomainError> {
        if child_ids.is_empty() {
            return Err(DomainError::validation(
                "child_ids",
                "A session needs at least one child",
            ));
        }

        let unique: BTreeSet<_> = child_ids.iter().collect();
        if unique.len() != child_ids.len() {
            return Err(DomainError::validation(
                "child_ids",
                "A child can only be listed once per session",
            ));
        }

        if session_type == SessionType::Individual && child_ids.len() != 1 {
            return Err(DomainError::validation(
                "child_ids",
                "Individual sessions have exactly one child",
            ));
        }

        Ok(())
    }
}
