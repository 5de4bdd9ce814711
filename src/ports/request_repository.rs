use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RequestId, Timestamp};
use crate::domain::request::ScheduleRequest;

/// Persistence for reschedule and cancel requests.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn save(&self, request: &ScheduleRequest) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `RequestNotFound` if the request doesn't exist
    async fn update(&self, request: &ScheduleRequest) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ScheduleRequest>, DomainError>;

    /// Pending requests, oldest first.
    async fn list_pending(&self) -> Result<Vec<ScheduleRequest>, DomainError>;

    async fn find_created_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<ScheduleRequest>, DomainError>;
}
