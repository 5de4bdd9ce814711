//! HS256 JWT validation.
//!
//! Tokens carry the account id (`sub`), email, role and expiry. The same
//! secret signs and verifies, so `issue` exists for tooling and tests.

use async_trait::async_trait;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};
use crate::domain::people::UserRole;
use crate::ports::SessionValidator;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

/// Validates HS256 tokens against a shared secret.
pub struct JwtSessionValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &Secret<String>) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding: DecodingKey::from_secret(bytes),
            encoding: EncodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Signs a token for `user` that expires at `expires_at`.
    pub fn issue(&self, user: &AuthenticatedUser, expires_at: Timestamp) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp: expires_at.as_datetime().timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign access token");
            AuthError::InvalidToken
        })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "Rejected access token");
                    AuthError::InvalidToken
                }
            })?;

        let claims = data.claims;
        let id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let role: UserRole = claims.role.parse().map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser::new(id, claims.email, role))
    }
}
