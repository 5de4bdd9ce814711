//! HTTP routes for session endpoints.

use axum::{routing::post, Router};

use super::handlers::{check_conflicts, create_session, SessionHandlers};

/// Creates the session router, mounted at `/api/sessions`.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/check-conflicts", post(check_conflicts))
        .with_state(handlers)
}
