//! Strict decoding of request bodies and path ids.
//!
//! Ids must be positive JSON integers and `present` a JSON boolean; strings,
//! floats and numeric truthiness are rejected with a field error.

use clubgest_core::{PlayerId, SessionId, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Body of `POST /attendance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordAttendanceRequest {
    pub player_id: PlayerId,
    pub session_id: SessionId,
    pub present: bool,
}

pub fn parse_record_attendance(body: &[u8]) -> Result<RecordAttendanceRequest, ValidationErrors> {
    let object = json_object(body)?;
    let mut errors = ValidationErrors::new();
    let player_id = required_id(&object, "playerId", &mut errors);
    let session_id = required_id(&object, "sessionId", &mut errors);
    let present = required_bool(&object, "present", &mut errors);
    reject_unknown(&object, &["playerId", "sessionId", "present"], &mut errors);

    match (player_id, session_id, present) {
        (Some(player_id), Some(session_id), Some(present)) if errors.is_empty() => {
            Ok(RecordAttendanceRequest {
                player_id,
                session_id,
                present,
            })
        }
        _ => Err(errors),
    }
}

/// Body of `PATCH /attendance/{playerId}/{sessionId}`.
pub fn parse_update_attendance(body: &[u8]) -> Result<bool, ValidationErrors> {
    parse_flag(body, "present")
}

/// Body of `PATCH /sessions/{id}/active`.
pub fn parse_session_active(body: &[u8]) -> Result<bool, ValidationErrors> {
    parse_flag(body, "active")
}

fn parse_flag(body: &[u8], field: &str) -> Result<bool, ValidationErrors> {
    let object = json_object(body)?;
    let mut errors = ValidationErrors::new();
    let value = required_bool(&object, field, &mut errors);
    reject_unknown(&object, &[field], &mut errors);
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(errors),
    }
}

/// Parses a path segment as a positive decimal id.
pub fn parse_path_id(field: &str, raw: &str) -> Result<i64, ValidationErrors> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationErrors::single(
            field,
            "must be a positive integer",
        ));
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(ValidationErrors::single(field, "must be a positive integer")),
        Err(_) => Err(ValidationErrors::single(field, "is out of range")),
    }
}

/// Decodes a typed roster payload, reporting serde failures under `body`.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationErrors> {
    serde_json::from_slice(body).map_err(|err| ValidationErrors::single("body", err.to_string()))
}

fn json_object(body: &[u8]) -> Result<Map<String, Value>, ValidationErrors> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ValidationErrors::single("body", "must be a JSON object")),
        Err(err) => Err(ValidationErrors::single(
            "body",
            format!("is not valid JSON: {err}"),
        )),
    }
}

fn required_id(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "is required");
            None
        }
        Some(Value::Number(number)) => match number.as_i64() {
            Some(id) if id > 0 => Some(id),
            _ => {
                errors.push(field, "must be a positive integer");
                None
            }
        },
        Some(_) => {
            errors.push(field, "must be a positive integer");
            None
        }
    }
}

fn required_bool(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "is required");
            None
        }
        Some(Value::Bool(value)) => Some(*value),
        Some(_) => {
            errors.push(field, "must be a boolean");
            None
        }
    }
}

fn reject_unknown(object: &Map<String, Value>, known: &[&str], errors: &mut ValidationErrors) {
    for key in object.keys().filter(|key| !known.contains(&key.as_str())) {
        errors.push(key.as_str(), "is not a recognized field");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.fields().iter().map(|error| error.field.as_str()).collect()
    }

    #[test]
    fn record_body_accepts_strict_types() {
        let parsed = parse_record_attendance(br#"{"playerId":3,"sessionId":8,"present":false}"#)
            .expect("valid body");
        assert_eq!(
            parsed,
            RecordAttendanceRequest {
                player_id: 3,
                session_id: 8,
                present: false
            }
        );
    }

    #[test]
    fn record_body_collects_every_bad_field() {
        let errors = parse_record_attendance(br#"{"playerId":"3","sessionId":1.5,"present":1}"#)
            .expect_err("loose types are rejected");
        assert_eq!(fields(&errors), ["playerId", "sessionId", "present"]);
    }

    #[test]
    fn record_body_rejects_non_positive_and_missing() {
        let errors =
            parse_record_attendance(br#"{"playerId":0,"present":true}"#).expect_err("invalid");
        assert_eq!(fields(&errors), ["playerId", "sessionId"]);
    }

    #[test]
    fn non_object_and_malformed_bodies_fail_on_body() {
        for body in [&b"[1,2]"[..], b"not json", b""] {
            let errors = parse_record_attendance(body).expect_err("rejected");
            assert_eq!(fields(&errors), ["body"]);
        }
    }

    #[test]
    fn update_body_requires_boolean_present() {
        assert_eq!(parse_update_attendance(br#"{"present":true}"#), Ok(true));
        let errors = parse_update_attendance(br#"{"present":"false"}"#).expect_err("string");
        assert_eq!(fields(&errors), ["present"]);
        let errors =
            parse_update_attendance(br#"{"present":true,"note":"late"}"#).expect_err("extra");
        assert_eq!(fields(&errors), ["note"]);
    }

    #[test]
    fn session_active_body_requires_boolean_active() {
        assert_eq!(parse_session_active(br#"{"active":false}"#), Ok(false));
        let errors = parse_session_active(br#"{"present":false}"#).expect_err("wrong key");
        assert_eq!(fields(&errors), ["active", "present"]);
    }

    #[test]
    fn path_ids_must_be_positive_decimals() {
        assert_eq!(parse_path_id("playerId", "42"), Ok(42));
        for raw in ["0", "-1", "+5", "abc", "1.0", ""] {
            assert!(parse_path_id("playerId", raw).is_err(), "{raw} accepted");
        }
        assert!(parse_path_id("playerId", "99999999999999999999").is_err());
    }
}
