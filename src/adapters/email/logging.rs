use async_trait::async_trait;

use crate::domain::notification::EmailMessage;
use crate::ports::{MailError, Mailer};

/// Logs outgoing emails instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LoggingMailer;

impl LoggingMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let preview: String = message.html.chars().take(200).collect();
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            preview = %preview,
            "Email would be sent"
        );
        Ok(())
    }
}
