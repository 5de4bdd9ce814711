//! HTTP routes for request endpoints.

use axum::{routing::post, Router};

use super::handlers::{approve_request, reject_request, submit_request, RequestHandlers};

/// Creates the request router, mounted at `/api/requests`.
pub fn request_routes(handlers: RequestHandlers) -> Router {
    Router::new()
        .route("/", post(submit_request))
        .route("/:id/approve", post(approve_request))
        .route("/:id/reject", post(reject_request))
        .with_state(handlers)
}
