//! JobRunner - drives scheduled jobs from their cron expressions.
//!
//! Each job gets its own loop: compute the next fire time, sleep until it,
//! run the job with the wall clock, log the report. A failed run is logged
//! and the loop carries on to the next fire time.
//!
//! ## Graceful Shutdown
//!
//! Every loop listens on the same watch channel. A run that is already in
//! progress finishes before its loop exits.

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time;

use super::CronSchedule;
use crate::application::jobs::{JobError, JobReport, ScheduledJob};
use crate::domain::foundation::Timestamp;

/// A job paired with the schedule it runs on.
#[derive(Clone)]
pub struct ScheduledEntry {
    pub job: Arc<dyn ScheduledJob>,
    pub schedule: CronSchedule,
}

impl ScheduledEntry {
    pub fn new(job: Arc<dyn ScheduledJob>, schedule: CronSchedule) -> Self {
        Self { job, schedule }
    }
}

/// Background service that runs jobs on cron schedules.
pub struct JobRunner {
    entries: Vec<ScheduledEntry>,
    offset: FixedOffset,
}

impl JobRunner {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            entries: Vec::new(),
            offset,
        }
    }

    pub fn with_job(mut self, job: Arc<dyn ScheduledJob>, schedule: CronSchedule) -> Self {
        self.entries.push(ScheduledEntry::new(job, schedule));
        self
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.job.name()).collect()
    }

    /// Runs one job by name immediately, outside its schedule.
    pub async fn trigger(&self, name: &str, now: Timestamp) -> Option<Result<JobReport, JobError>> {
        let entry = self.entries.iter().find(|e| e.job.name() == name)?;
        Some(run_logged(entry.job.as_ref(), now).await)
    }

    /// Run all job loops until the shutdown signal is received.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        let mut loops = JoinSet::new();
        for entry in self.entries.iter().cloned() {
            tracing::info!(
                job = entry.job.name(),
                schedule = %entry.schedule,
                "Scheduling job"
            );
            loops.spawn(job_loop(entry, self.offset, shutdown.clone()));
        }

        while let Some(joined) = loops.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Job loop terminated abnormally");
            }
        }
        tracing::info!("Job runner stopped");
    }
}

async fn job_loop(entry: ScheduledEntry, offset: FixedOffset, mut shutdown: watch::Receiver<bool>) {
    let name = entry.job.name();
    loop {
        if *shutdown.borrow() {
            return;
        }

        let now = Timestamp::now();
        let Some(next) = entry.schedule.next_after(now, offset) else {
            tracing::warn!(job = name, schedule = %entry.schedule, "Schedule never fires; job disabled");
            return;
        };
        let wait = next
            .duration_since(&now)
            .to_std()
            .unwrap_or(Duration::ZERO);

        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!(job = name, "Job loop shutting down");
                    return;
                }
            }

            _ = time::sleep(wait) => {
                let _ = run_logged(entry.job.as_ref(), Timestamp::now()).await;
            }
        }
    }
}

async fn run_logged(job: &dyn ScheduledJob, now: Timestamp) -> Result<JobReport, JobError> {
    let started = std::time::Instant::now();
    let result = job.run(now).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(report) => tracing::info!(
            job = job.name(),
            elapsed_ms,
            report = ?report,
            "Job run completed"
        ),
        Err(e) => tracing::error!(job = job.name(), elapsed_ms, error = %e, "Job run failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::jobs::MilestoneReport;
    use crate::domain::foundation::DomainError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        runs: AtomicUsize,
        fail: bool,
    }

    impl CountingJob {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self, _now: Timestamp) -> Result<JobReport, JobError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::database("boom").into());
            }
            Ok(JobReport::Milestones(MilestoneReport::default()))
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn trigger_runs_named_job() {
        let job = CountingJob::new(false);
        let runner = JobRunner::new(utc()).with_job(job.clone(), "0 6 * * *".parse().unwrap());

        let result = runner.trigger("counting", Timestamp::now()).await;

        assert!(matches!(result, Some(Ok(JobReport::Milestones(_)))));
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn trigger_unknown_job_returns_none() {
        let runner = JobRunner::new(utc());
        assert!(runner.trigger("missing", Timestamp::now()).await.is_none());
    }

    #[tokio::test]
    async fn trigger_surfaces_job_errors() {
        let job = CountingJob::new(true);
        let runner = JobRunner::new(utc()).with_job(job.clone(), "*/5 * * * *".parse().unwrap());

        let result = runner.trigger("counting", Timestamp::now()).await;

        assert!(matches!(result, Some(Err(JobError::Repository(_)))));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let job = CountingJob::new(false);
        let runner = JobRunner::new(utc()).with_job(job.clone(), "0 6 * * *".parse().unwrap());
        assert_eq!(runner.job_names(), vec!["counting"]);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn never_firing_schedule_exits_immediately() {
        let job = CountingJob::new(false);
        let runner = JobRunner::new(utc()).with_job(job.clone(), "0 0 31 2 *".parse().unwrap());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let result = tokio::time::timeout(Duration::from_secs(5), runner.run(shutdown_rx)).await;

        assert!(result.is_ok());
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }
}
