//! HTTP adapter for report endpoints.
//!
//! - `GET /api/reports/weekly?start=&end=`
//! - `GET /api/reports/monthly?start=&end=`
//!
//! `start` and `end` are RFC 3339 instants; the range is inclusive.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::error::{bad_request, handle_domain_error};
use super::middleware::RequireAdmin;
use crate::application::handlers::{GenerateReportHandler, GenerateReportQuery};
use crate::domain::foundation::Timestamp;
use crate::domain::report::{ReportPeriod, ReportRange};

#[derive(Debug, Clone, Deserialize)]
pub struct ReportParams {
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Clone)]
pub struct ReportHandlers {
    generate_handler: Arc<GenerateReportHandler>,
}

impl ReportHandlers {
    pub fn new(generate_handler: Arc<GenerateReportHandler>) -> Self {
        Self { generate_handler }
    }
}

async fn generate(handlers: &ReportHandlers, period: ReportPeriod, params: ReportParams) -> Response {
    let range = match ReportRange::new(params.start, params.end) {
        Ok(range) => range,
        Err(e) => return bad_request(e.to_string()),
    };

    match handlers.generate_handler.handle(GenerateReportQuery { period, range }).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// GET /api/reports/weekly
pub async fn weekly_report(
    State(handlers): State<ReportHandlers>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ReportParams>,
) -> Response {
    generate(&handlers, ReportPeriod::Weekly, params).await
}

/// GET /api/reports/monthly
pub async fn monthly_report(
    State(handlers): State<ReportHandlers>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ReportParams>,
) -> Response {
    generate(&handlers, ReportPeriod::Monthly, params).await
}

/// Creates the report router, mounted at `/api/reports`.
pub fn report_routes(handlers: ReportHandlers) -> Router {
    Router::new()
        .route("/weekly", get(weekly_report))
        .route("/monthly", get(monthly_report))
        .with_state(handlers)
}
