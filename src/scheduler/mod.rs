//! Cron scheduling for background jobs.
//!
//! - `cron` - 5-field cron expressions evaluated at a fixed UTC offset
//! - `runner` - one loop per job, stopped by a shutdown watch channel

mod cron;
mod runner;

pub use cron::{CronError, CronSchedule};
pub use runner::{JobRunner, ScheduledEntry};
