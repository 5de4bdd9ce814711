//! PostgreSQL implementation of MilestoneRepository.
//!
//! `milestone_awards` carries a unique (child_id, rule_id) constraint, so
//! concurrent job runs cannot double-award.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::rows::{column, db_error, timestamp_column};
use crate::domain::foundation::{
    ChildId, DomainError, MilestoneAwardId, MilestoneRuleId, Timestamp,
};
use crate::domain::milestone::{MilestoneAward, MilestoneRule};
use crate::ports::MilestoneRepository;

/// PostgreSQL implementation of MilestoneRepository.
#[derive(Clone)]
pub struct PostgresMilestoneRepository {
    pool: PgPool,
}

impl PostgresMilestoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneRepository for PostgresMilestoneRepository {
    async fn save_rule(&self, rule: &MilestoneRule) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO milestone_rules (id, name, condition, reward_type, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                condition = EXCLUDED.condition,
                reward_type = EXCLUDED.reward_type,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(rule.id.as_uuid())
        .bind(&rule.name)
        .bind(&rule.condition)
        .bind(&rule.reward_type)
        .bind(rule.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save milestone rule", e))?;

        Ok(())
    }

    async fn list_active_rules(&self) -> Result<Vec<MilestoneRule>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, condition, reward_type, is_active
            FROM milestone_rules
            WHERE is_active
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list milestone rules", e))?;

        rows.iter().map(row_to_rule).collect()
    }

    async fn award_exists(
        &self,
        child_id: &ChildId,
        rule_id: &MilestoneRuleId,
    ) -> Result<bool, DomainError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM milestone_awards WHERE child_id = $1 AND rule_id = $2)",
        )
        .bind(child_id.as_uuid())
        .bind(rule_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("check milestone award", e))?;

        Ok(result.0)
    }

    async fn insert_award(&self, award: &MilestoneAward) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO milestone_awards (id, child_id, rule_id, awarded_at, artifact_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (child_id, rule_id) DO NOTHING
            "#,
        )
        .bind(award.id.as_uuid())
        .bind(award.child_id.as_uuid())
        .bind(award.rule_id.as_uuid())
        .bind(award.awarded_at.as_datetime())
        .bind(&award.artifact_url)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert milestone award", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_awards_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<MilestoneAward>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, rule_id, awarded_at, artifact_url
            FROM milestone_awards
            WHERE awarded_at BETWEEN $1 AND $2
            ORDER BY awarded_at
            "#,
        )
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch milestone awards", e))?;

        rows.iter()
            .map(|row| {
                Ok(MilestoneAward {
                    id: MilestoneAwardId::from_uuid(column(row, "id")?),
                    child_id: ChildId::from_uuid(column(row, "child_id")?),
                    rule_id: MilestoneRuleId::from_uuid(column(row, "rule_id")?),
                    awarded_at: timestamp_column(row, "awarded_at")?,
                    artifact_url: column(row, "artifact_url")?,
                })
            })
            .collect()
    }
}

fn row_to_rule(row: &PgRow) -> Result<MilestoneRule, DomainError> {
    let condition: Value = column(row, "condition")?;
    Ok(MilestoneRule {
        id: MilestoneRuleId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        condition,
        reward_type: column(row, "reward_type")?,
        is_active: column(row, "is_active")?,
    })
}
