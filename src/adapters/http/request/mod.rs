//! HTTP adapter for reschedule/cancel requests.
//!
//! - `POST /api/requests` - submit (parent for own child, or admin)
//! - `POST /api/requests/:id/approve` - admin approves
//! - `POST /api/requests/:id/reject` - admin rejects with a reason

mod dto;
mod handlers;
mod routes;

pub use dto::{ApproveRequestBody, ApproveRequestResponse, RejectRequestBody, SubmitRequestBody};
pub use handlers::RequestHandlers;
pub use routes::request_routes;
