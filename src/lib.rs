//! Grow Fitness - coaching business backend.
//!
//! Schedules coaching sessions without double-booking coaches or children,
//! routes parent reschedule and cancellation requests through admin
//! approval, and runs cron-driven jobs for session reminders, daily digests
//! and milestone awards.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod scheduler;
