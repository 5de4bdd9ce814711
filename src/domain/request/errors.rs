//! Request resolution errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, RequestId, SessionId};
use crate::domain::session::{Conflict, SessionError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Request not found: {0}")]
    NotFound(RequestId),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Approving a reschedule needs the slot to move to.
    #[error("A new slot is required to approve a reschedule request")]
    MissingNewSlot,

    #[error("Scheduling conflict: {}", .0.iter().map(Conflict::message).collect::<Vec<_>>().join("; "))]
    Conflict(Vec<Conflict>),

    #[error("Permission denied")]
    Forbidden,

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl RequestError {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        RequestError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RequestError::NotFound(_) => ErrorCode::RequestNotFound,
            RequestError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            RequestError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            RequestError::MissingNewSlot | RequestError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            RequestError::Conflict(_) => ErrorCode::ScheduleConflict,
            RequestError::Forbidden => ErrorCode::Forbidden,
            RequestError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for RequestError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => RequestError::InvalidState(err.message),
            ErrorCode::ValidationFailed => RequestError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::ScheduleConflict => RequestError::Conflict(vec![Conflict::Coach]),
            _ => RequestError::Infrastructure(err.to_string()),
        }
    }
}

impl From<SessionError> for RequestError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => RequestError::SessionNotFound(id),
            SessionError::Conflict(conflicts) => RequestError::Conflict(conflicts),
            SessionError::InvalidState(msg) => RequestError::InvalidState(msg),
            SessionError::ValidationFailed { field, message } => {
                RequestError::ValidationFailed { field, message }
            }
            SessionError::Infrastructure(msg) => RequestError::Infrastructure(msg),
        }
    }
}
