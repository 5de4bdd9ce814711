//! HTTP adapter for on-demand job runs.
//!
//! - `POST /api/jobs/:job/run` where `:job` is `reminders`, `digest` or
//!   `milestones`
//!
//! Runs are synchronous and return the job report. An optional `now`
//! query parameter evaluates the job as of that instant.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::error::{handle_job_error, respond, ErrorResponse};
use super::middleware::RequireAdmin;
use crate::application::jobs::ScheduledJob;
use crate::domain::foundation::Timestamp;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunJobParams {
    pub now: Option<Timestamp>,
}

#[derive(Clone)]
pub struct JobHandlers {
    jobs: Arc<HashMap<&'static str, Arc<dyn ScheduledJob>>>,
}

impl JobHandlers {
    pub fn new(jobs: impl IntoIterator<Item = Arc<dyn ScheduledJob>>) -> Self {
        let jobs = jobs.into_iter().map(|job| (job.name(), job)).collect();
        Self {
            jobs: Arc::new(jobs),
        }
    }
}

/// POST /api/jobs/:job/run
pub async fn run_job(
    State(handlers): State<JobHandlers>,
    RequireAdmin(admin): RequireAdmin,
    Path(job_name): Path<String>,
    Query(params): Query<RunJobParams>,
) -> Response {
    let Some(job) = handlers.jobs.get(job_name.as_str()) else {
        return respond(
            StatusCode::NOT_FOUND,
            ErrorResponse::new("NOT_FOUND", format!("Unknown job: {}", job_name)),
        );
    };

    let now = params.now.unwrap_or_else(Timestamp::now);
    tracing::info!(job = job.name(), admin_id = %admin.id, now = %now, "Job triggered over HTTP");

    match job.run(now).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => handle_job_error(job.name(), e),
    }
}

/// Creates the job router, mounted at `/api/jobs`.
pub fn job_routes(handlers: JobHandlers) -> Router {
    Router::new()
        .route("/:job/run", post(run_job))
        .with_state(handlers)
}
