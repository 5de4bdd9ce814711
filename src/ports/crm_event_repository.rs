use async_trait::async_trait;

use crate::domain::crm::CrmEvent;
use crate::domain::foundation::DomainError;

/// Append-only CRM event log.
#[async_trait]
pub trait CrmEventRepository: Send + Sync {
    async fn append(&self, event: &CrmEvent) -> Result<(), DomainError>;
}
