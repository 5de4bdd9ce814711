//! Outbound email content.
//!
//! Templates are pure functions from domain data to an [`EmailMessage`].
//! Delivery lives behind the `Mailer` port.

mod message;
mod templates;

pub use message::EmailMessage;
pub use templates::{
    daily_digest, milestone_congratulations, session_reminder, DigestRequestLine,
    DigestSessionLine, ReminderDetails,
};
