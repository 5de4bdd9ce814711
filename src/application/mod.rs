//! Application layer - command/query handlers and scheduled jobs.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod jobs;

#[cfg(test)]
pub(crate) mod testing;
