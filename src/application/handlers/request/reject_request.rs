//! RejectRequestHandler - declines a request and leaves the session as is.

use std::sync::Arc;

use crate::domain::crm::CrmEvent;
use crate::domain::foundation::{RequestId, Timestamp, UserId};
use crate::domain::request::{RequestError, ScheduleRequest};
use crate::ports::{CrmEventRepository, RequestRepository};

#[derive(Debug, Clone)]
pub struct RejectRequestCommand {
    pub request_id: RequestId,
    pub admin_id: UserId,
    pub reason: String,
}

pub struct RejectRequestHandler {
    requests: Arc<dyn RequestRepository>,
    crm: Arc<dyn CrmEventRepository>,
}

impl RejectRequestHandler {
    pub fn new(requests: Arc<dyn RequestRepository>, crm: Arc<dyn CrmEventRepository>) -> Self {
        Self { requests, crm }
    }

    pub async fn handle(&self, cmd: RejectRequestCommand) -> Result<ScheduleRequest, RequestError> {
        let reason = cmd.reason.trim().to_string();
        if reason.is_empty() {
            return Err(RequestError::ValidationFailed {
                field: "reason".into(),
                message: "A rejection reason is required".into(),
            });
        }

        let mut request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or(RequestError::NotFound(cmd.request_id))?;

        let now = Timestamp::now();
        request.reject(reason.clone(), now)?;
        self.requests.update(&request).await?;

        let event = CrmEvent::request_rejected(cmd.admin_id, &request, &reason, now);
        self.crm.append(&event).await?;

        tracing::info!(
            request_id = %request.id,
            admin_id = %cmd.admin_id,
            "Schedule request rejected"
        );

        Ok(request)
    }
}
