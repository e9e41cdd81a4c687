//! Training session record owned by the roster (session directory).
//!
//! # Invariants
//! - `starts_at` is a local wall-clock timestamp with second precision.
//! - `duration_minutes`, when set, is within 15..=300.
//! - `active == false` marks a cancelled session; it still accepts attendance.

use super::validation::{check_text_length, normalize_optional, ValidationErrors};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage-assigned session identifier.
pub type SessionId = i64;

/// Training focus of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Technical,
    Tactical,
    Physical,
    Mixed,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Tactical => "tactical",
            Self::Physical => "physical",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "technical" => Some(Self::Technical),
            "tactical" => Some(Self::Tactical),
            "physical" => Some(Self::Physical),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Persisted training session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: SessionId,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: Option<u16>,
    pub location: Option<String>,
    pub kind: Option<SessionKind>,
    pub active: bool,
}

/// Input for scheduling a training session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTrainingSession {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starts_at: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub kind: Option<SessionKind>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewTrainingSession {
    pub fn new(name: impl Into<String>, starts_at: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            description: None,
            starts_at,
            duration_minutes: None,
            location: None,
            kind: None,
            active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text_length(&mut errors, "name", Some(self.name.as_str()), 3, 100);
        check_text_length(
            &mut errors,
            "description",
            self.description.as_deref(),
            0,
            500,
        );
        check_text_length(&mut errors, "location", self.location.as_deref(), 0, 100);
        if let Some(minutes) = self.duration_minutes {
            if !(15..=300).contains(&minutes) {
                errors.push("durationMinutes", "must be between 15 and 300");
            }
        }
        errors.into_result()
    }

    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: normalize_optional(self.description.as_deref()),
            location: normalize_optional(self.location.as_deref()),
            ..self.clone()
        }
    }
}
