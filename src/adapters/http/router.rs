//! Top-level API router.
//!
//! ```text
//! GET  /health
//! /api/sessions   → session_routes
//! /api/requests   → request_routes
//! /api/invoices   → invoice_routes
//! /api/reports    → report_routes
//! /api/jobs       → job_routes
//! ```
//!
//! Every `/api` route passes through `auth_middleware`; role checks happen in
//! the extractors.

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::invoice::{invoice_routes, InvoiceHandlers};
use super::job::{job_routes, JobHandlers};
use super::middleware::{auth_middleware, AuthState};
use super::report::{report_routes, ReportHandlers};
use super::request::{request_routes, RequestHandlers};
use super::session::{session_routes, SessionHandlers};
use crate::config::ServerConfig;

/// Handler state for every API module.
#[derive(Clone)]
pub struct ApiHandlers {
    pub sessions: SessionHandlers,
    pub requests: RequestHandlers,
    pub invoices: InvoiceHandlers,
    pub reports: ReportHandlers,
    pub jobs: JobHandlers,
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router without transport layers.
pub fn api_router(handlers: ApiHandlers, validator: AuthState) -> Router {
    let api = Router::new()
        .nest("/sessions", session_routes(handlers.sessions))
        .nest("/requests", request_routes(handlers.requests))
        .nest("/invoices", invoice_routes(handlers.invoices))
        .nest("/reports", report_routes(handlers.reports))
        .nest("/jobs", job_routes(handlers.jobs))
        .layer(middleware::from_fn_with_state(validator, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}

/// Wraps a router with tracing, CORS and request timeout layers.
pub fn with_http_layers(router: Router, server: &ServerConfig) -> Router {
    router
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}
