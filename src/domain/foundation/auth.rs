//! Authentication types for the domain layer.
//!
//! These types represent an authenticated caller extracted from a bearer
//! token. Any token scheme can populate them via the `SessionValidator` port.

use super::UserId;
use crate::domain::people::UserRole;
use thiserror::Error;

/// Authenticated caller extracted from a validated JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The account identifier (`sub` claim).
    pub id: UserId,

    /// Email address from the token claims.
    pub email: String,

    /// Role granted to the account.
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the role does not allow the action.
    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl AuthError {
    /// Returns true if this error indicates the caller should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
