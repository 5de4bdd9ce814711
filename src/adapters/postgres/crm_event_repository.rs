//! PostgreSQL implementation of CrmEventRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::db_error;
use crate::domain::crm::CrmEvent;
use crate::domain::foundation::DomainError;
use crate::ports::CrmEventRepository;

/// PostgreSQL implementation of CrmEventRepository.
#[derive(Clone)]
pub struct PostgresCrmEventRepository {
    pool: PgPool,
}

impl PostgresCrmEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrmEventRepository for PostgresCrmEventRepository {
    async fn append(&self, event: &CrmEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO crm_events (id, actor_id, subject_id, kind, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.actor_id.as_uuid())
        .bind(event.subject_id)
        .bind(event.kind.as_str())
        .bind(&event.payload)
        .bind(event.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("append CRM event", e))?;

        Ok(())
    }
}
