//! PostgreSQL implementation of InvoiceRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::rows::{column, db_error, optional_timestamp_column, parsed_column, timestamp_column};
use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp, UserId};
use crate::domain::invoice::{Invoice, PaymentMethod};
use crate::ports::InvoiceRepository;

const INVOICE_COLUMNS: &str = "id, parent_id, amount_lkr, status, paid_date, paid_method, created_at";

/// PostgreSQL implementation of InvoiceRepository.
#[derive(Clone)]
pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
    async fn save(&self, invoice: &Invoice) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (id, parent_id, amount_lkr, status, paid_date, paid_method, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.parent_id.as_uuid())
        .bind(invoice.amount_lkr)
        .bind(invoice.status.as_str())
        .bind(invoice.paid_date.as_ref().map(|t| *t.as_datetime()))
        .bind(invoice.paid_method.map(|m| m.as_str()))
        .bind(invoice.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert invoice", e))?;

        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = $2,
                paid_date = $3,
                paid_method = $4
            WHERE id = $1
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.status.as_str())
        .bind(invoice.paid_date.as_ref().map(|t| *t.as_datetime()))
        .bind(invoice.paid_method.map(|m| m.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update invoice", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::InvoiceNotFound,
                format!("Invoice not found: {}", invoice.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM invoices WHERE id = $1", INVOICE_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch invoice", e))?;

        row.as_ref().map(row_to_invoice).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Invoice>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list invoices", e))?;

        rows.iter().map(row_to_invoice).collect()
    }

    async fn find_created_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Invoice>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE created_at BETWEEN $1 AND $2 ORDER BY created_at",
            INVOICE_COLUMNS
        ))
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch invoices by date", e))?;

        rows.iter().map(row_to_invoice).collect()
    }
}

fn row_to_invoice(row: &PgRow) -> Result<Invoice, DomainError> {
    let paid_method: Option<String> = column(row, "paid_method")?;
    let paid_method = paid_method
        .map(|m| m.parse::<PaymentMethod>())
        .transpose()
        .map_err(|e| db_error("parse paid_method", e))?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(column(row, "id")?),
        parent_id: UserId::from_uuid(column(row, "parent_id")?),
        amount_lkr: column(row, "amount_lkr")?,
        status: parsed_column(row, "status")?,
        paid_date: optional_timestamp_column(row, "paid_date")?,
        paid_method,
        created_at: timestamp_column(row, "created_at")?,
    })
}
