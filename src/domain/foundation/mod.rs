//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the coaching domain.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    ChildId, CrmEventId, InvoiceId, LocationId, MilestoneAwardId, MilestoneRuleId, RequestId,
    SessionId, UserId,
};
pub use timestamp::Timestamp;
