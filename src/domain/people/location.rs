//! Training locations.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LocationId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub label: String,
}

impl Location {
    pub fn new(label: impl Into<String>) -> Result<Self, ValidationError> {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return Err(ValidationError::empty_field("label"));
        }
        Ok(Self {
            id: LocationId::new(),
            label,
        })
    }
}
