//! Session repository port.
//!
//! Besides plain persistence this port exposes the two queries the
//! scheduling core depends on: overlap candidates for conflict checks, and
//! start-time windows for the reminder and digest jobs.

use async_trait::async_trait;

use crate::domain::foundation::{ChildId, DomainError, SessionId, Timestamp, UserId};
use crate::domain::session::{ReminderKind, Session, TimeSlot};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Update an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Booked sessions overlapping `slot` that involve `coach_id` or any of
    /// `child_ids`.
    ///
    /// Implementations may return a superset; callers filter again with
    /// `detect_conflicts`.
    async fn find_booked_overlapping(
        &self,
        slot: &TimeSlot,
        coach_id: &UserId,
        child_ids: &[ChildId],
    ) -> Result<Vec<Session>, DomainError>;

    /// Booked sessions with `from <= start_at <= to`, ordered by start.
    async fn find_booked_starting_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError>;

    /// Sessions of any status with `from <= start_at <= to`, ordered by start.
    async fn find_starting_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError>;

    /// Atomically records `kind` on the session's sent reminders.
    ///
    /// Returns `false` when the reminder was already recorded or the session
    /// is no longer booked, so concurrent runs never both send.
    async fn claim_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<bool, DomainError>;

    /// Undoes a claim whose emails all failed.
    async fn release_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<(), DomainError>;

    /// Number of completed sessions that include the child.
    async fn count_completed_for_child(&self, child_id: &ChildId) -> Result<u64, DomainError>;
}
