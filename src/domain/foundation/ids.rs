//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a user account (admin, coach or parent).
    UserId
);
uuid_id!(
    /// Identifier of a child enrolled by a parent.
    ChildId
);
uuid_id!(
    /// Identifier of a coaching session.
    SessionId
);
uuid_id!(
    /// Identifier of a reschedule or cancel request.
    RequestId
);
uuid_id!(
    /// Identifier of a training location.
    LocationId
);
uuid_id!(MilestoneRuleId);
uuid_id!(MilestoneAwardId);
uuid_id!(CrmEventId);
uuid_id!(InvoiceId);

impl UserId {
    /// The actor recorded for changes made by background jobs.
    pub fn system() -> Self {
        Self(Uuid::nil())
    }

    /// Returns true for the background-job actor.
    pub fn is_system(&self) -> bool {
        self.0.is_nil()
    }
}
