//! MarkInvoicePaidHandler - records a payment against an invoice.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp};
use crate::domain::invoice::{Invoice, PaymentMethod};
use crate::ports::InvoiceRepository;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    #[error("Invoice not found: {0}")]
    NotFound(InvoiceId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl InvoiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            InvoiceError::NotFound(_) => ErrorCode::InvoiceNotFound,
            InvoiceError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            InvoiceError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for InvoiceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => InvoiceError::InvalidState(err.message),
            _ => InvoiceError::Infrastructure(err.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkInvoicePaidCommand {
    pub invoice_id: InvoiceId,
    pub method: PaymentMethod,
    pub paid_date: Option<Timestamp>,
}

pub struct MarkInvoicePaidHandler {
    invoices: Arc<dyn InvoiceRepository>,
}

impl MarkInvoicePaidHandler {
    pub fn new(invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { invoices }
    }

    pub async fn handle(&self, cmd: MarkInvoicePaidCommand) -> Result<Invoice, InvoiceError> {
        let mut invoice = self
            .invoices
            .find_by_id(&cmd.invoice_id)
            .await?
            .ok_or(InvoiceError::NotFound(cmd.invoice_id))?;

        invoice.mark_paid(cmd.method, cmd.paid_date, Timestamp::now())?;
        self.invoices.update(&invoice).await?;

        tracing::info!(
            invoice_id = %invoice.id,
            amount_lkr = invoice.amount_lkr,
            method = cmd.method.as_str(),
            "Invoice marked paid"
        );

        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::UserId;

    #[tokio::test]
    async fn marks_unpaid_invoice_paid_once() {
        let store = Arc::new(InMemoryStore::new());
        let invoice = Invoice::issue(UserId::new(), 6_000, Timestamp::now()).unwrap();
        InvoiceRepository::save(store.as_ref(), &invoice).await.unwrap();
        let handler = MarkInvoicePaidHandler::new(store.clone());
        let cmd = MarkInvoicePaidCommand {
            invoice_id: invoice.id,
            method: PaymentMethod::Bank,
            paid_date: None,
        };

        let paid = handler.handle(cmd.clone()).await.unwrap();
        assert!(paid.is_paid());

        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let handler = MarkInvoicePaidHandler::new(Arc::new(InMemoryStore::new()));
        let id = InvoiceId::new();
        let err = handler
            .handle(MarkInvoicePaidCommand {
                invoice_id: id,
                method: PaymentMethod::Cash,
                paid_date: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, InvoiceError::NotFound(id));
    }
}
