//! Composition root: wires repositories, handlers and jobs together.
//!
//! `main` picks the storage backend and mailer from configuration; tests
//! use the same wiring over an `InMemoryStore`.

use std::sync::Arc;

use chrono::FixedOffset;
use sqlx::PgPool;

use crate::adapters::http::{
    ApiHandlers, InvoiceHandlers, JobHandlers, ReportHandlers, RequestHandlers, SessionHandlers,
};
use crate::adapters::memory::InMemoryStore;
use crate::adapters::postgres::{
    PostgresChildRepository, PostgresCrmEventRepository, PostgresInvoiceRepository,
    PostgresLocationRepository, PostgresMilestoneRepository, PostgresRequestRepository,
    PostgresSessionRepository, PostgresUserRepository,
};
use crate::application::handlers::{
    ApproveRequestHandler, CheckConflictsHandler, CreateSessionHandler, GenerateReportHandler,
    InvoiceSummaryHandler, MarkInvoicePaidHandler, RejectRequestHandler, SubmitRequestHandler,
};
use crate::application::jobs::{DailyDigestJob, MilestoneJob, ReminderJob, ScheduledJob};
use crate::config::{SchedulerConfig, ValidationError};
use crate::ports::{
    ChildRepository, CrmEventRepository, InvoiceRepository, LocationRepository, Mailer,
    MilestoneRepository, RequestRepository, SessionRepository, UserRepository,
};
use crate::scheduler::JobRunner;

/// One implementation of every repository port.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub children: Arc<dyn ChildRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub milestones: Arc<dyn MilestoneRepository>,
    pub crm: Arc<dyn CrmEventRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
}

impl Repositories {
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            children: store.clone(),
            locations: store.clone(),
            sessions: store.clone(),
            requests: store.clone(),
            milestones: store.clone(),
            crm: store.clone(),
            invoices: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            children: Arc::new(PostgresChildRepository::new(pool.clone())),
            locations: Arc::new(PostgresLocationRepository::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
            requests: Arc::new(PostgresRequestRepository::new(pool.clone())),
            milestones: Arc::new(PostgresMilestoneRepository::new(pool.clone())),
            crm: Arc::new(PostgresCrmEventRepository::new(pool.clone())),
            invoices: Arc::new(PostgresInvoiceRepository::new(pool)),
        }
    }
}

/// Wired application: HTTP handler state plus the scheduled jobs.
pub struct App {
    pub handlers: ApiHandlers,
    pub jobs: Vec<Arc<dyn ScheduledJob>>,
}

pub fn build_app(repos: &Repositories, mailer: Arc<dyn Mailer>, offset: FixedOffset) -> App {
    let reminders: Arc<dyn ScheduledJob> = Arc::new(ReminderJob::new(
        repos.sessions.clone(),
        repos.children.clone(),
        repos.users.clone(),
        repos.locations.clone(),
        mailer.clone(),
        offset,
    ));
    let digest: Arc<dyn ScheduledJob> = Arc::new(DailyDigestJob::new(
        repos.sessions.clone(),
        repos.requests.clone(),
        repos.users.clone(),
        repos.children.clone(),
        repos.locations.clone(),
        mailer.clone(),
        offset,
    ));
    let milestones: Arc<dyn ScheduledJob> = Arc::new(MilestoneJob::new(
        repos.children.clone(),
        repos.users.clone(),
        repos.sessions.clone(),
        repos.milestones.clone(),
        repos.crm.clone(),
        mailer,
        offset,
    ));
    let jobs = vec![reminders, digest, milestones];

    let handlers = ApiHandlers {
        sessions: SessionHandlers::new(
            Arc::new(CreateSessionHandler::new(
                repos.sessions.clone(),
                repos.users.clone(),
                repos.children.clone(),
            )),
            Arc::new(CheckConflictsHandler::new(repos.sessions.clone())),
        ),
        requests: RequestHandlers::new(
            Arc::new(SubmitRequestHandler::new(
                repos.sessions.clone(),
                repos.requests.clone(),
                repos.children.clone(),
            )),
            Arc::new(ApproveRequestHandler::new(
                repos.sessions.clone(),
                repos.requests.clone(),
                repos.crm.clone(),
            )),
            Arc::new(RejectRequestHandler::new(repos.requests.clone(), repos.crm.clone())),
        ),
        invoices: InvoiceHandlers::new(
            Arc::new(MarkInvoicePaidHandler::new(repos.invoices.clone())),
            Arc::new(InvoiceSummaryHandler::new(repos.invoices.clone())),
        ),
        reports: ReportHandlers::new(Arc::new(GenerateReportHandler::new(
            repos.sessions.clone(),
            repos.invoices.clone(),
            repos.milestones.clone(),
            repos.requests.clone(),
            repos.users.clone(),
            repos.children.clone(),
        ))),
        jobs: JobHandlers::new(jobs.iter().cloned()),
    };

    App { handlers, jobs }
}

/// Builds the cron runner, attaching each job to its configured schedule.
pub fn job_runner(
    jobs: &[Arc<dyn ScheduledJob>],
    config: &SchedulerConfig,
) -> Result<JobRunner, ValidationError> {
    let mut runner = JobRunner::new(config.offset()?);
    for job in jobs {
        let schedule = match job.name() {
            "reminders" => config.reminders()?,
            "digest" => config.digest()?,
            "milestones" => config.milestones()?,
            other => {
                tracing::warn!(job = other, "No schedule configured for job");
                continue;
            }
        };
        runner = runner.with_job(job.clone(), schedule);
    }
    Ok(runner)
}
