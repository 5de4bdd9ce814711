//! Email configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Resend)
///
/// Without an API key outbound mail is logged instead of sent.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: Option<Secret<String>>,

    /// Resend API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn sends_real_mail(&self) -> bool {
        self.resend_api_key.is_some()
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = &self.resend_api_key {
            if !key.expose_secret().starts_with("re_") {
                return Err(ValidationError::InvalidResendKey);
            }
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            api_base_url: default_api_base_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from_email() -> String {
    "noreply@growfitness.lk".to_string()
}

fn default_from_name() -> String {
    "Grow Fitness".to_string()
}
