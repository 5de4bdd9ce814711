//! User accounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// Role of an account. Admins run the business, coaches run sessions,
/// parents enrol children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Coach,
    Parent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Coach => "coach",
            UserRole::Parent => "parent",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "coach" => Ok(UserRole::Coach),
            "parent" => Ok(UserRole::Parent),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: UserRole,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if name is blank
    /// - `InvalidFormat` if email has no `@`
    pub fn new(
        role: UserRole,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_lowercase();
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }

        Ok(Self {
            id: UserId::new(),
            role,
            email,
            name,
            phone: None,
            created_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_email() {
        let user = User::new(UserRole::Parent, "  Parent@Example.COM ", "Nimal").unwrap();
        assert_eq!(user.email, "parent@example.com");
        assert_eq!(user.name, "Nimal");
    }

    #[test]
    fn rejects_blank_name() {
        assert!(matches!(
            User::new(UserRole::Coach, "coach@example.com", "   "),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn rejects_email_without_at() {
        assert!(User::new(UserRole::Coach, "coach.example.com", "Kamal").is_err());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [UserRole::Admin, UserRole::Coach, UserRole::Parent] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }
}
