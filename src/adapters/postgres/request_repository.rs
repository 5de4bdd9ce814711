//! PostgreSQL implementation of RequestRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::rows::{column, db_error, optional_timestamp_column, parsed_column, timestamp_column};
use crate::domain::foundation::{DomainError, ErrorCode, RequestId, SessionId, Timestamp, UserId};
use crate::domain::request::ScheduleRequest;
use crate::ports::RequestRepository;

const REQUEST_COLUMNS: &str = "id, request_type, session_id, requester_id, reason, is_late, \
    status, admin_note, decided_at, created_at";

/// PostgreSQL implementation of RequestRepository.
#[derive(Clone)]
pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn save(&self, request: &ScheduleRequest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO requests (
                id, request_type, session_id, requester_id, reason, is_late,
                status, admin_note, decided_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.request_type.as_str())
        .bind(request.session_id.as_uuid())
        .bind(request.requester_id.as_uuid())
        .bind(&request.reason)
        .bind(request.is_late)
        .bind(request.status.as_str())
        .bind(&request.admin_note)
        .bind(request.decided_at.as_ref().map(|t| *t.as_datetime()))
        .bind(request.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert request", e))?;

        Ok(())
    }

    async fn update(&self, request: &ScheduleRequest) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE requests SET
                status = $2,
                admin_note = $3,
                decided_at = $4
            WHERE id = $1
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.status.as_str())
        .bind(&request.admin_note)
        .bind(request.decided_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update request", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Request not found: {}", request.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ScheduleRequest>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM requests WHERE id = $1", REQUEST_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch request", e))?;

        row.as_ref().map(row_to_request).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<ScheduleRequest>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM requests WHERE status = 'pending' ORDER BY created_at",
            REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list pending requests", e))?;

        rows.iter().map(row_to_request).collect()
    }

    async fn find_created_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<ScheduleRequest>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM requests WHERE created_at BETWEEN $1 AND $2 ORDER BY created_at",
            REQUEST_COLUMNS
        ))
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch requests by date", e))?;

        rows.iter().map(row_to_request).collect()
    }
}

fn row_to_request(row: &PgRow) -> Result<ScheduleRequest, DomainError> {
    Ok(ScheduleRequest {
        id: RequestId::from_uuid(column(row, "id")?),
        request_type: parsed_column(row, "request_type")?,
        session_id: SessionId::from_uuid(column(row, "session_id")?),
        requester_id: UserId::from_uuid(column(row, "requester_id")?),
        reason: column(row, "reason")?,
        is_late: column(row, "is_late")?,
        status: parsed_column(row, "status")?,
        admin_note: column(row, "admin_note")?,
        decided_at: optional_timestamp_column(row, "decided_at")?,
        created_at: timestamp_column(row, "created_at")?,
    })
}
