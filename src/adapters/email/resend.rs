//! Resend mailer - posts rendered emails to the Resend REST API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::notification::EmailMessage;
use crate::ports::{MailError, Mailer};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Configuration for the Resend mailer.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    api_key: Secret<String>,
    /// Value of the `from` header, e.g. `Grow Fitness <noreply@growfitness.lk>`.
    pub from: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ResendConfig {
    pub fn new(api_key: Secret<String>, from: impl Into<String>) -> Self {
        Self {
            api_key,
            from: from.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct ResendMailer {
    config: ResendConfig,
    client: Client,
}

impl ResendMailer {
    /// # Errors
    ///
    /// Returns `MailError::Transport` if the HTTP client cannot be built.
    pub fn new(config: ResendConfig) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if !message.to.contains('@') {
            return Err(MailError::InvalidRecipient(message.to.clone()));
        }

        let body = ResendRequest {
            from: &self.config.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailError::Transport(format!(
                        "Timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    MailError::Transport(format!("Connection failed: {}", e))
                } else {
                    MailError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %message.to, subject = %message.subject, "Email sent");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        tracing::warn!(
            to = %message.to,
            status = status.as_u16(),
            "Resend rejected email"
        );
        Err(MailError::Rejected {
            status: status.as_u16(),
            message: error_body,
        })
    }
}
