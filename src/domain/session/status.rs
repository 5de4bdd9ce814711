//! SessionStatus enum for tracking the lifecycle of a booked session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Lifecycle status of a coaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Booked,
    Canceled,
    Completed,
}

impl SessionStatus {
    /// Only booked sessions block the calendar and receive reminders.
    pub fn is_booked(&self) -> bool {
        matches!(self, SessionStatus::Booked)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Booked -> Canceled
    /// - Booked -> Completed
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        use SessionStatus::*;
        matches!((self, target), (Booked, Canceled) | (Booked, Completed))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Booked => "booked",
            SessionStatus::Canceled => "canceled",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(SessionStatus::Booked),
            "canceled" => Ok(SessionStatus::Canceled),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown session status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_booked() {
        assert_eq!(SessionStatus::default(), SessionStatus::Booked);
    }

    #[test]
    fn booked_can_be_canceled_or_completed() {
        assert!(SessionStatus::Booked.can_transition_to(&SessionStatus::Canceled));
        assert!(SessionStatus::Booked.can_transition_to(&SessionStatus::Completed));
    }

    #[test]
    fn terminal_statuses_cannot_transition() {
        for from in [SessionStatus::Canceled, SessionStatus::Completed] {
            for to in [SessionStatus::Booked, SessionStatus::Canceled, SessionStatus::Completed] {
                assert!(!from.can_transition_to(&to));
            }
        }
    }

    #[test]
    fn parses_from_storage_string() {
        assert_eq!("canceled".parse::<SessionStatus>().unwrap(), SessionStatus::Canceled);
        assert!("archived".parse::<SessionStatus>().is_err());
    }
}
