//! CRM activity log.
//!
//! Every decision that changes a family's schedule, and every award, leaves
//! an append-only event so staff can see the history of a relationship.

mod event;

pub use event::{CrmEvent, CrmEventKind};
