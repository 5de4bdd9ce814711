//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `people` - Users, children and locations
//! - `session` - Session booking, lifecycle and conflict detection
//! - `request` - Reschedule/cancel requests and their resolution rules
//! - `crm` - Append-only CRM activity events
//! - `milestone` - Milestone rules, condition evaluation and awards
//! - `invoice` - Invoices and payment summaries
//! - `report` - Weekly/monthly report generation
//! - `notification` - Email templates

pub mod crm;
pub mod foundation;
pub mod invoice;
pub mod milestone;
pub mod notification;
pub mod people;
pub mod report;
pub mod request;
pub mod session;
