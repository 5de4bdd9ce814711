//! Authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (HS256 bearer tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify access tokens
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Secret::new(jwt_secret.into()),
        }
    }

    /// Validate authentication configuration
    ///
    /// Production requires a secret of at least 32 characters.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_missing_secret() {
        let config = AuthConfig::new("");
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_short_secret_allowed_outside_production() {
        let config = AuthConfig::new("dev-secret");
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::JwtSecretTooShort(32))
        ));
    }

    #[test]
    fn test_long_secret_valid_in_production() {
        let config = AuthConfig::new("x".repeat(48));
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = AuthConfig::new("super-secret-value");
        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
