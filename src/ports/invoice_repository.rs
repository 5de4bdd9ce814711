use async_trait::async_trait;

use crate::domain::foundation::{DomainError, InvoiceId, Timestamp};
use crate::domain::invoice::Invoice;

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn save(&self, invoice: &Invoice) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `InvoiceNotFound` if the invoice doesn't exist
    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError>;

    async fn list_all(&self) -> Result<Vec<Invoice>, DomainError>;

    async fn find_created_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Invoice>, DomainError>;
}
