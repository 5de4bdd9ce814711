//! Error responses shared by every HTTP module.
//!
//! Each application error type maps to a status code here so handlers stay
//! a straight line from request to command to response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::handlers::InvoiceError;
use crate::application::jobs::JobError;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::request::RequestError;
use crate::domain::session::{Conflict, SessionError};

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code.to_string(), message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

pub(crate) fn respond(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

pub(crate) fn bad_request(message: impl Into<String>) -> Response {
    respond(StatusCode::BAD_REQUEST, ErrorResponse::bad_request(message))
}

fn conflict_response(code: ErrorCode, conflicts: &[Conflict]) -> Response {
    let messages: Vec<String> = conflicts.iter().map(Conflict::message).collect();
    respond(
        StatusCode::CONFLICT,
        ErrorResponse::from_code(code, format!("Scheduling conflict: {}", messages.join("; ")))
            .with_details(serde_json::json!({
                "conflicts": conflicts,
                "messages": messages,
            })),
    )
}

fn internal(code: ErrorCode, message: &str) -> Response {
    tracing::error!(code = %code, error = %message, "Request failed");
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::internal("Internal server error"),
    )
}

pub(crate) fn handle_session_error(error: SessionError) -> Response {
    let code = error.code();
    match &error {
        SessionError::NotFound(_) => {
            respond(StatusCode::NOT_FOUND, ErrorResponse::from_code(code, error.to_string()))
        }
        SessionError::Conflict(conflicts) => conflict_response(code, conflicts),
        SessionError::InvalidState(_) | SessionError::ValidationFailed { .. } => {
            respond(StatusCode::BAD_REQUEST, ErrorResponse::from_code(code, error.to_string()))
        }
        SessionError::Infrastructure(msg) => internal(code, msg),
    }
}

pub(crate) fn handle_request_error(error: RequestError) -> Response {
    let code = error.code();
    match &error {
        RequestError::NotFound(_) | RequestError::SessionNotFound(_) => {
            respond(StatusCode::NOT_FOUND, ErrorResponse::from_code(code, error.to_string()))
        }
        RequestError::Conflict(conflicts) => conflict_response(code, conflicts),
        RequestError::Forbidden => {
            respond(StatusCode::FORBIDDEN, ErrorResponse::from_code(code, error.to_string()))
        }
        RequestError::InvalidState(_)
        | RequestError::MissingNewSlot
        | RequestError::ValidationFailed { .. } => {
            respond(StatusCode::BAD_REQUEST, ErrorResponse::from_code(code, error.to_string()))
        }
        RequestError::Infrastructure(msg) => internal(code, msg),
    }
}

pub(crate) fn handle_invoice_error(error: InvoiceError) -> Response {
    let code = error.code();
    match &error {
        InvoiceError::NotFound(_) => {
            respond(StatusCode::NOT_FOUND, ErrorResponse::from_code(code, error.to_string()))
        }
        InvoiceError::InvalidState(_) => {
            respond(StatusCode::BAD_REQUEST, ErrorResponse::from_code(code, error.to_string()))
        }
        InvoiceError::Infrastructure(msg) => internal(code, msg),
    }
}

pub(crate) fn handle_domain_error(error: DomainError) -> Response {
    match error.code {
        ErrorCode::ValidationFailed => respond(
            StatusCode::BAD_REQUEST,
            ErrorResponse::from_code(error.code, error.message),
        ),
        code => internal(code, &error.message),
    }
}

pub(crate) fn handle_job_error(job: &str, error: JobError) -> Response {
    tracing::error!(job, error = %error, "Triggered job failed");
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::internal(format!("Job '{}' failed", job)),
    )
}
