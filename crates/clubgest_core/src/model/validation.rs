//! Field-level validation errors shared by roster and attendance input.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the field (`playerId`, `squadNumber`, ...).
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Non-empty collection of field errors for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns `Ok(())` when nothing was collected, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid input: {joined}")
    }
}

impl Error for ValidationErrors {}

/// Checks an optional text field against an inclusive char-length range.
pub(crate) fn check_text_length(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) {
    let Some(value) = value else {
        return;
    };
    let length = value.trim().chars().count();
    if length < min {
        errors.push(field, format!("must be at least {min} characters"));
    } else if length > max {
        errors.push(field, format!("must not exceed {max} characters"));
    }
}

/// Trims an optional text field, mapping blank input to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Checks that an id is a positive integer.
pub fn check_id(errors: &mut ValidationErrors, field: &str, value: i64) {
    if value < 1 {
        errors.push(field, "must be a positive integer");
    }
}

#[cfg(test)]
mod tests {
    use super::{check_text_length, ValidationErrors};

    #[test]
    fn text_length_uses_chars_not_bytes() {
        let mut errors = ValidationErrors::new();
        check_text_length(&mut errors, "name", Some("Raúl"), 4, 4);
        assert!(errors.is_empty());
    }

    #[test]
    fn display_joins_every_field() {
        let mut errors = ValidationErrors::single("name", "must be at least 2 characters");
        errors.push("weightKg", "must be between 30 and 250");
        let text = errors.to_string();
        assert!(text.contains("name: must be at least 2 characters"));
        assert!(text.contains("weightKg"));
    }
}
