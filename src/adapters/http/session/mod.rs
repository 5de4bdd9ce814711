//! HTTP adapter for session endpoints.
//!
//! - `POST /api/sessions` - book a session (409 on conflict)
//! - `POST /api/sessions/check-conflicts` - dry-run the conflict check

mod dto;
mod handlers;
mod routes;

pub use dto::{CheckConflictsRequest, ConflictCheckResponse, CreateSessionRequest, SessionResponse};
pub use handlers::SessionHandlers;
pub use routes::session_routes;
