//! Outbound email port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::EmailMessage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    /// The provider refused the message.
    #[error("Mail provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider could not be reached.
    #[error("Mail transport failed: {0}")]
    Transport(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Delivers rendered emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}
