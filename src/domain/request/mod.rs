//! Reschedule and cancel requests filed against booked sessions.

mod aggregate;
mod errors;

pub use aggregate::{RequestStatus, RequestType, ScheduleRequest, LATE_REQUEST_WINDOW_HOURS};
pub use errors::RequestError;
