//! Email delivery adapters.
//!
//! - `ResendMailer` - production delivery through the Resend HTTP API
//! - `LoggingMailer` - logs instead of sending (development)
//! - `RecordingMailer` - captures messages for assertions (tests)

mod logging;
mod recording;
mod resend;

pub use logging::LoggingMailer;
pub use recording::RecordingMailer;
pub use resend::{ResendConfig, ResendMailer};
