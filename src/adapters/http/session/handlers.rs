//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::handle_session_error;
use crate::adapters::http::middleware::RequireAdmin;
use crate::application::handlers::{CheckConflictsHandler, CreateSessionCommand, CreateSessionHandler};
use crate::domain::session::{ConflictQuery, SessionError, TimeSlot};

use super::dto::{CheckConflictsRequest, ConflictCheckResponse, CreateSessionRequest, SessionResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    create_handler: Arc<CreateSessionHandler>,
    check_handler: Arc<CheckConflictsHandler>,
}

impl SessionHandlers {
    pub fn new(
        create_handler: Arc<CreateSessionHandler>,
        check_handler: Arc<CheckConflictsHandler>,
    ) -> Self {
        Self {
            create_handler,
            check_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Book a session
pub async fn create_session(
    State(handlers): State<SessionHandlers>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let slot = match TimeSlot::new(req.start_at, req.end_at) {
        Ok(slot) => slot,
        Err(e) => return handle_session_error(SessionError::validation(e.field(), e.to_string())),
    };

    let cmd = CreateSessionCommand {
        session_type: req.session_type,
        coach_id: req.coach_id,
        child_ids: req.child_ids,
        location_id: req.location_id,
        slot,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(session) => {
            tracing::info!(admin_id = %admin.id, session_id = %session.id(), "Session booked over HTTP");
            (StatusCode::CREATED, Json(SessionResponse::from(&session))).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/check-conflicts - Report who would be double-booked
pub async fn check_conflicts(
    State(handlers): State<SessionHandlers>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CheckConflictsRequest>,
) -> Response {
    let slot = match TimeSlot::new(req.start_at, req.end_at) {
        Ok(slot) => slot,
        Err(e) => return handle_session_error(SessionError::validation(e.field(), e.to_string())),
    };

    let mut query = ConflictQuery::new(req.coach_id, req.child_ids, slot);
    if let Some(id) = req.exclude_session_id {
        query = query.excluding(id);
    }

    match handlers.check_handler.handle(query).await {
        Ok(conflicts) => {
            (StatusCode::OK, Json(ConflictCheckResponse::from(conflicts))).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}
