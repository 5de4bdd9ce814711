use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::notification::EmailMessage;
use crate::ports::{MailError, Mailer};

/// Captures sent emails in memory.
///
/// Recipients registered with [`RecordingMailer::fail_for`] get a transport
/// error instead.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(recipient.into());
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.to == recipient)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let should_fail = self
            .failing
            .lock()
            .map(|f| f.contains(&message.to))
            .unwrap_or(false);
        if should_fail {
            return Err(MailError::Transport(format!(
                "Simulated failure for {}",
                message.to
            )));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Transport("Recording lock poisoned".into()))?
            .push(message.clone());
        Ok(())
    }
}
