//! SubmitRequestHandler - a parent asks to move or cancel a session.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, SessionId, Timestamp};
use crate::domain::people::UserRole;
use crate::domain::request::{RequestError, RequestType, ScheduleRequest};
use crate::ports::{ChildRepository, RequestRepository, SessionRepository};

#[derive(Debug, Clone)]
pub struct SubmitRequestCommand {
    pub requester: AuthenticatedUser,
    pub request_type: RequestType,
    pub session_id: SessionId,
    pub reason: String,
}

pub struct SubmitRequestHandler {
    sessions: Arc<dyn SessionRepository>,
    requests: Arc<dyn RequestRepository>,
    children: Arc<dyn ChildRepository>,
}

impl SubmitRequestHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        requests: Arc<dyn RequestRepository>,
        children: Arc<dyn ChildRepository>,
    ) -> Self {
        Self {
            sessions,
            requests,
            children,
        }
    }

    pub async fn handle(&self, cmd: SubmitRequestCommand) -> Result<ScheduleRequest, RequestError> {
        let session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or(RequestError::SessionNotFound(cmd.session_id))?;

        // Parents may only file for sessions their own children attend.
        match cmd.requester.role {
            UserRole::Admin => {}
            UserRole::Parent => {
                let children = self.children.find_by_ids(session.child_ids()).await?;
                if !children.iter().any(|c| c.parent_id == cmd.requester.id) {
                    return Err(RequestError::Forbidden);
                }
            }
            UserRole::Coach => return Err(RequestError::Forbidden),
        }

        let request = ScheduleRequest::submit(
            cmd.request_type,
            &session,
            cmd.requester.id,
            cmd.reason,
            Timestamp::now(),
        )?;
        self.requests.save(&request).await?;

        tracing::info!(
            request_id = %request.id,
            session_id = %request.session_id,
            request_type = %request.request_type,
            is_late = request.is_late,
            "Schedule request submitted"
        );

        Ok(request)
    }
}
