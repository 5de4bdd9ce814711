//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

use super::Conflict;

/// Errors raised while booking or changing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// Booking would double-book the coach or a child.
    #[error("Scheduling conflict: {}", join_messages(.0))]
    Conflict(Vec<Conflict>),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

fn join_messages(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(Conflict::message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::Conflict(_) => ErrorCode::ScheduleConflict,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Individual conflict messages, empty for other variants.
    pub fn conflict_messages(&self) -> Vec<String> {
        match self {
            SessionError::Conflict(conflicts) => conflicts.iter().map(Conflict::message).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.message),
            ErrorCode::ValidationFailed => SessionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            // Storage only enforces the coach side of double-booking.
            ErrorCode::ScheduleConflict => SessionError::Conflict(vec![Conflict::Coach]),
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}
