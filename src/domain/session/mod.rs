//! Session domain module.
//!
//! A session is a booked slot in which one coach trains one or more
//! children at a location. This module owns the booking invariants, the
//! status lifecycle, reminder bookkeeping and overlap detection.

mod aggregate;
mod conflict;
mod errors;
mod status;

pub use aggregate::{ReminderKind, Session, SessionType, TimeSlot};
pub use conflict::{detect_conflicts, Conflict, ConflictQuery};
pub use errors::SessionError;
pub use status::SessionStatus;
