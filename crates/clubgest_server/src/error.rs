//! HTTP-facing error taxonomy.
//!
//! # Invariants
//! - Lookup failures are 404 with `status: "not-found"` and a stable `code`.
//! - Validation failures are 400 with per-field `errors`.
//! - Storage and internal failures are logged with detail but answered with a
//!   generic 500 body.

use clubgest_core::{AttendanceServiceError, RosterServiceError, ValidationErrors};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use log::error;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

/// Error returned by route handlers, rendered by `into_response`.
#[derive(Debug)]
pub enum ApiError {
    NotFound {
        code: &'static str,
        message: String,
    },
    InvalidInput(ValidationErrors),
    MethodNotAllowed,
    PayloadTooLarge,
    Timeout,
    Internal(String),
}

impl ApiError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput(ValidationErrors::single(field, message))
    }

    pub fn unknown_route(path: &str) -> Self {
        Self::NotFound {
            code: "unknown_route",
            message: format!("no route for `{path}`"),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::NotFound { code, message } => json!({
                "status": "not-found",
                "code": code,
                "message": message,
            }),
            Self::InvalidInput(errors) => json!({
                "status": "bad-request",
                "message": "request validation failed",
                "errors": errors.fields(),
            }),
            Self::MethodNotAllowed => json!({
                "status": "method-not-allowed",
                "message": "method not allowed for this route",
            }),
            Self::PayloadTooLarge => json!({
                "status": "payload-too-large",
                "message": "request body is too large",
            }),
            Self::Timeout => json!({
                "status": "timeout",
                "message": "request deadline exceeded",
            }),
            Self::Internal(_) => json!({
                "status": "internal-error",
                "message": "internal server error",
            }),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        if let Self::Internal(detail) = &self {
            error!("event=http_error module=http status=error error={detail}");
        }
        json_response(self.status(), &self.body())
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { message, .. } => write!(f, "{message}"),
            Self::InvalidInput(errors) => write!(f, "{errors}"),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::Timeout => write!(f, "request deadline exceeded"),
            Self::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AttendanceServiceError> for ApiError {
    fn from(value: AttendanceServiceError) -> Self {
        match value {
            AttendanceServiceError::UnknownPlayer(_) => Self::NotFound {
                code: "unknown_player",
                message: value.to_string(),
            },
            AttendanceServiceError::UnknownSession(_) => Self::NotFound {
                code: "unknown_session",
                message: value.to_string(),
            },
            AttendanceServiceError::UnknownAttendance { .. } => Self::NotFound {
                code: "unknown_attendance",
                message: value.to_string(),
            },
            AttendanceServiceError::InvalidInput(errors) => Self::InvalidInput(errors),
            AttendanceServiceError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<RosterServiceError> for ApiError {
    fn from(value: RosterServiceError) -> Self {
        match value {
            RosterServiceError::PlayerNotFound(_) => Self::NotFound {
                code: "unknown_player",
                message: value.to_string(),
            },
            RosterServiceError::SessionNotFound(_) => Self::NotFound {
                code: "unknown_session",
                message: value.to_string(),
            },
            RosterServiceError::InvalidInput(errors) => Self::InvalidInput(errors),
            RosterServiceError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::InvalidInput(value)
    }
}

pub fn json_response(status: StatusCode, body: &impl serde::Serialize) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(bytes)))
            .unwrap_or_else(|_| fallback_response()),
        Err(err) => {
            error!("event=http_encode module=http status=error error={err}");
            fallback_response()
        }
    }
}

pub fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| fallback_response())
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"status":"internal-error","message":"internal server error"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
