//! Children enrolled by parents.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{ChildId, UserId, ValidationError};

const MIN_AGE: i64 = 1;
const MAX_AGE: i64 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ValidationError::invalid_format(
                "gender",
                format!("unknown gender '{}'", other),
            )),
        }
    }
}

/// A child attending coaching sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub parent_id: UserId,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub medical_condition: Option<String>,
    pub goals: Vec<String>,
}

impl Child {
    /// Enrols a new child under a parent account.
    pub fn new(
        parent_id: UserId,
        name: impl Into<String>,
        age: u8,
        gender: Gender,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&(age as i64)) {
            return Err(ValidationError::out_of_range("age", MIN_AGE, MAX_AGE, age as i64));
        }

        Ok(Self {
            id: ChildId::new(),
            parent_id,
            name,
            age,
            gender,
            medical_condition: None,
            goals: Vec::new(),
        })
    }

    pub fn with_goals(mut self, goals: Vec<String>) -> Self {
        self.goals = goals;
        self
    }
}
