//! PostgreSQL implementation of SessionRepository.
//!
//! Child ids and sent reminders live in array columns so overlap queries
//! and reminder claims are single statements.

use std::collections::BTreeSet;
use std::fmt::Display;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{column, db_error, parsed_column, timestamp_column};
use crate::domain::foundation::{
    ChildId, DomainError, ErrorCode, LocationId, SessionId, Timestamp, UserId,
};
use crate::domain::session::{ReminderKind, Session, SessionStatus, TimeSlot};
use crate::ports::SessionRepository;

/// SQLSTATE raised by the `sessions_no_coach_overlap` constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

const SESSION_COLUMNS: &str = "id, session_type, coach_id, child_ids, location_id, start_at, \
    end_at, status, reminders_sent, created_at, updated_at";

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        sql: &str,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(sql)
            .bind(from.as_datetime())
            .bind(to.as_datetime())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("fetch sessions by start", e))?;

        rows.iter().map(row_to_session).collect()
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, session_type, coach_id, child_ids, location_id, start_at, end_at,
                status, reminders_sent, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.session_type().as_str())
        .bind(session.coach_id().as_uuid())
        .bind(child_uuids(session.child_ids()))
        .bind(session.location_id().as_uuid())
        .bind(session.start_at().as_datetime())
        .bind(session.end_at().as_datetime())
        .bind(session.status().as_str())
        .bind(reminder_strings(session.reminders_sent()))
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("insert session", e))?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                child_ids = $2,
                location_id = $3,
                start_at = $4,
                end_at = $5,
                status = $6,
                reminders_sent = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(child_uuids(session.child_ids()))
        .bind(session.location_id().as_uuid())
        .bind(session.start_at().as_datetime())
        .bind(session.end_at().as_datetime())
        .bind(session.status().as_str())
        .bind(reminder_strings(session.reminders_sent()))
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("update session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM sessions WHERE id = $1", SESSION_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch session", e))?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn find_booked_overlapping(
        &self,
        slot: &TimeSlot,
        coach_id: &UserId,
        child_ids: &[ChildId],
    ) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM sessions
            WHERE status = 'booked'
              AND start_at < $2
              AND end_at > $1
              AND (coach_id = $3 OR child_ids && $4)
            ORDER BY start_at
            "#,
            SESSION_COLUMNS
        ))
        .bind(slot.start_at().as_datetime())
        .bind(slot.end_at().as_datetime())
        .bind(coach_id.as_uuid())
        .bind(child_uuids(child_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch overlapping sessions", e))?;

        rows.iter().map(row_to_session).collect()
    }

    async fn find_booked_starting_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let sql = format!(
            "SELECT {} FROM sessions WHERE status = 'booked' AND start_at BETWEEN $1 AND $2 ORDER BY start_at",
            SESSION_COLUMNS
        );
        self.fetch_many(&sql, from, to).await
    }

    async fn find_starting_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let sql = format!(
            "SELECT {} FROM sessions WHERE start_at BETWEEN $1 AND $2 ORDER BY start_at",
            SESSION_COLUMNS
        );
        self.fetch_many(&sql, from, to).await
    }

    async fn claim_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                reminders_sent = array_append(reminders_sent, $2),
                updated_at = NOW()
            WHERE id = $1
              AND status = 'booked'
              AND NOT ($2 = ANY(reminders_sent))
            "#,
        )
        .bind(id.as_uuid())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("claim reminder", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE sessions SET
                reminders_sent = array_remove(reminders_sent, $2),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("release reminder", e))?;

        Ok(())
    }

    async fn count_completed_for_child(&self, child_id: &ChildId) -> Result<u64, DomainError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sessions WHERE status = 'completed' AND $1 = ANY(child_ids)",
        )
        .bind(child_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count completed sessions", e))?;

        Ok(result.0.max(0) as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn child_uuids(ids: &[ChildId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

fn reminder_strings(sent: &BTreeSet<ReminderKind>) -> Vec<String> {
    sent.iter().map(|k| k.as_str().to_string()).collect()
}

fn parse_reminders(raw: Vec<String>) -> Result<BTreeSet<ReminderKind>, DomainError> {
    raw.iter()
        .map(|s| {
            s.parse::<ReminderKind>()
                .map_err(|e| db_error(&format!("parse reminder '{}'", s), e))
        })
        .collect()
}

fn write_error(context: &str, e: sqlx::Error) -> DomainError {
    let sqlstate = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned());
    classify_write_error(context, sqlstate.as_deref(), e)
}

/// A coach double-booking that slipped past the handler's check surfaces
/// as a schedule conflict rather than a database failure.
fn classify_write_error(context: &str, sqlstate: Option<&str>, e: impl Display) -> DomainError {
    if sqlstate == Some(EXCLUSION_VIOLATION) {
        return DomainError::new(
            ErrorCode::ScheduleConflict,
            "Coach is already booked for an overlapping session",
        );
    }
    db_error(context, e)
}

fn row_to_session(row: &PgRow) -> Result<Session, DomainError> {
    let child_ids: Vec<Uuid> = column(row, "child_ids")?;
    let reminders: Vec<String> = column(row, "reminders_sent")?;
    let slot = TimeSlot::new(timestamp_column(row, "start_at")?, timestamp_column(row, "end_at")?)
        .map_err(|e| db_error("decode session slot", e))?;
    let status: SessionStatus = parsed_column(row, "status")?;

    Ok(Session::reconstitute(
        SessionId::from_uuid(column(row, "id")?),
        parsed_column(row, "session_type")?,
        UserId::from_uuid(column(row, "coach_id")?),
        child_ids.into_iter().map(ChildId::from_uuid).collect(),
        LocationId::from_uuid(column(row, "location_id")?),
        slot,
        status,
        parse_reminders(reminders)?,
        timestamp_column(row, "created_at")?,
        timestamp_column(row, "updated_at")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_columns_round_trip() {
        let sent: BTreeSet<ReminderKind> = ReminderKind::ALL.into_iter().collect();
        assert_eq!(parse_reminders(reminder_strings(&sent)).unwrap(), sent);
    }

    #[test]
    fn unknown_reminder_label_is_a_database_error() {
        let err = parse_reminders(vec!["2h".to_string()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn exclusion_violation_becomes_schedule_conflict() {
        let err = classify_write_error("insert session", Some("23P01"), sqlx::Error::RowNotFound);
        assert_eq!(err.code, ErrorCode::ScheduleConflict);

        let err = classify_write_error("insert session", Some("23505"), sqlx::Error::RowNotFound);
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.starts_with("Failed to insert session"));
    }
}
