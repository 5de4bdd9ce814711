//! HTTP handlers for request endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{bad_request, handle_request_error};
use crate::adapters::http::middleware::{RequireAdmin, RequireAuth};
use crate::application::handlers::{
    ApproveRequestCommand, ApproveRequestHandler, RejectRequestCommand, RejectRequestHandler,
    SubmitRequestCommand, SubmitRequestHandler,
};
use crate::domain::foundation::RequestId;
use crate::domain::request::RequestError;
use crate::domain::session::TimeSlot;

use super::dto::{ApproveRequestBody, ApproveRequestResponse, RejectRequestBody, SubmitRequestBody};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct RequestHandlers {
    submit_handler: Arc<SubmitRequestHandler>,
    approve_handler: Arc<ApproveRequestHandler>,
    reject_handler: Arc<RejectRequestHandler>,
}

impl RequestHandlers {
    pub fn new(
        submit_handler: Arc<SubmitRequestHandler>,
        approve_handler: Arc<ApproveRequestHandler>,
        reject_handler: Arc<RejectRequestHandler>,
    ) -> Self {
        Self {
            submit_handler,
            approve_handler,
            reject_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/requests - Submit a reschedule or cancel request
pub async fn submit_request(
    State(handlers): State<RequestHandlers>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<SubmitRequestBody>,
) -> Response {
    let cmd = SubmitRequestCommand {
        requester: user,
        request_type: body.request_type,
        session_id: body.session_id,
        reason: body.reason,
    };

    match handlers.submit_handler.handle(cmd).await {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(e) => handle_request_error(e),
    }
}

/// POST /api/requests/:id/approve - Approve a pending request
pub async fn approve_request(
    State(handlers): State<RequestHandlers>,
    RequireAdmin(admin): RequireAdmin,
    Path(request_id): Path<String>,
    Json(body): Json<ApproveRequestBody>,
) -> Response {
    let Ok(request_id) = request_id.parse::<RequestId>() else {
        return bad_request("Invalid request ID");
    };

    let new_slot = match (body.new_start_at, body.new_end_at) {
        (Some(start), Some(end)) => match TimeSlot::new(start, end) {
            Ok(slot) => Some(slot),
            Err(e) => {
                return handle_request_error(RequestError::ValidationFailed {
                    field: e.field().to_string(),
                    message: e.to_string(),
                })
            }
        },
        (None, None) => None,
        _ => return bad_request("new_start_at and new_end_at must be given together"),
    };

    let cmd = ApproveRequestCommand {
        request_id,
        admin_id: admin.id,
        new_slot,
        note: body.note,
    };

    match handlers.approve_handler.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(ApproveRequestResponse::from(result))).into_response(),
        Err(e) => handle_request_error(e),
    }
}

/// POST /api/requests/:id/reject - Reject a pending request
pub async fn reject_request(
    State(handlers): State<RequestHandlers>,
    RequireAdmin(admin): RequireAdmin,
    Path(request_id): Path<String>,
    Json(body): Json<RejectRequestBody>,
) -> Response {
    let Ok(request_id) = request_id.parse::<RequestId>() else {
        return bad_request("Invalid request ID");
    };

    let cmd = RejectRequestCommand {
        request_id,
        admin_id: admin.id,
        reason: body.reason,
    };

    match handlers.reject_handler.handle(cmd).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => handle_request_error(e),
    }
}
