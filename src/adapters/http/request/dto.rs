//! Data transfer objects for request endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::session::SessionResponse;
use crate::application::handlers::ApproveRequestResult;
use crate::domain::crm::CrmEvent;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::request::{RequestType, ScheduleRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequestBody {
    pub request_type: RequestType,
    pub session_id: SessionId,
    pub reason: String,
}

/// Approval body. Reschedules need both new times.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveRequestBody {
    pub new_start_at: Option<Timestamp>,
    pub new_end_at: Option<Timestamp>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectRequestBody {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveRequestResponse {
    pub request: ScheduleRequest,
    pub session: SessionResponse,
    pub event: CrmEvent,
}

impl From<ApproveRequestResult> for ApproveRequestResponse {
    fn from(result: ApproveRequestResult) -> Self {
        Self {
            session: SessionResponse::from(&result.session),
            request: result.request,
            event: result.event,
        }
    }
}
