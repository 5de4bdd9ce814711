//! Request submission and resolution handlers.

mod approve_request;
mod reject_request;
mod submit_request;

pub use approve_request::{ApproveRequestCommand, ApproveRequestHandler, ApproveRequestResult};
pub use reject_request::{RejectRequestCommand, RejectRequestHandler};
pub use submit_request::{SubmitRequestCommand, SubmitRequestHandler};
