//! Player record owned by the roster (player directory).
//!
//! # Invariants
//! - `name` is 2..=100 characters after trimming.
//! - `squad_number`, when set, is within 1..=99.
//! - `birth_date`, when set, is not in the future.

use super::validation::{check_text_length, normalize_optional, ValidationErrors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage-assigned player identifier.
pub type PlayerId = i64;

const WEIGHT_MIN_KG: f64 = 30.0;
const WEIGHT_MAX_KG: f64 = 250.0;

/// Persisted player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub surname: Option<String>,
    pub position: Option<String>,
    pub squad_number: Option<u8>,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
}

/// Input for creating a player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub squad_number: Option<i64>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

impl NewPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: None,
            position: None,
            squad_number: None,
            birth_date: None,
            weight_kg: None,
        }
    }

    /// Validates every field, collecting all failures.
    ///
    /// `today` bounds `birth_date`; callers pass the current local date.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text_length(&mut errors, "name", Some(self.name.as_str()), 2, 100);
        check_text_length(&mut errors, "surname", self.surname.as_deref(), 0, 150);
        check_text_length(&mut errors, "position", self.position.as_deref(), 0, 50);

        if let Some(number) = self.squad_number {
            if !(1..=99).contains(&number) {
                errors.push("squadNumber", "must be between 1 and 99");
            }
        }
        if let Some(birth_date) = self.birth_date {
            if birth_date > today {
                errors.push("birthDate", "must not be in the future");
            }
        }
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || !(WEIGHT_MIN_KG..=WEIGHT_MAX_KG).contains(&weight) {
                errors.push("weightKg", "must be between 30 and 250");
            }
        }

        errors.into_result()
    }

    /// Trims text fields and drops blank optionals.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            surname: normalize_optional(self.surname.as_deref()),
            position: normalize_optional(self.position.as_deref()),
            ..self.clone()
        }
    }
}
