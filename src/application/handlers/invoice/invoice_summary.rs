use std::sync::Arc;

use crate::domain::invoice::InvoiceSummary;
use crate::ports::InvoiceRepository;

use super::InvoiceError;

/// Totals across every invoice on record.
pub struct InvoiceSummaryHandler {
    invoices: Arc<dyn InvoiceRepository>,
}

impl InvoiceSummaryHandler {
    pub fn new(invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { invoices }
    }

    pub async fn handle(&self) -> Result<InvoiceSummary, InvoiceError> {
        let invoices = self.invoices.list_all().await?;
        Ok(InvoiceSummary::from_invoices(&invoices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::invoice::{Invoice, PaymentMethod};

    #[tokio::test]
    async fn summarizes_stored_invoices() {
        let store = Arc::new(InMemoryStore::new());
        let now = Timestamp::now();
        let mut paid = Invoice::issue(UserId::new(), 1_000, now).unwrap();
        paid.mark_paid(PaymentMethod::Cash, None, now).unwrap();
        let unpaid = Invoice::issue(UserId::new(), 250, now).unwrap();
        InvoiceRepository::save(store.as_ref(), &paid).await.unwrap();
        InvoiceRepository::save(store.as_ref(), &unpaid).await.unwrap();

        let summary = InvoiceSummaryHandler::new(store).handle().await.unwrap();

        assert_eq!(summary.total_paid, 1_000);
        assert_eq!(summary.total_unpaid, 250);
        assert_eq!(summary.total_invoices, 2);
    }
}
