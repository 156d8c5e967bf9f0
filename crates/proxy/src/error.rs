//! Error normalization for the proxy routes
//!
//! Every failure a route can hit, whether a missing backend URL, a transport
//! error, a non-2xx backend reply or an unreadable request body, ends up as a
//! [`ProxyError`] and is rendered as `{ "error": <message> }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::BACKEND_URL_ENV;

/// Fixed notice that replaces any backend wording about expired tokens
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Markers that identify an expired-token failure, matched case-insensitively
const EXPIRY_MARKERS: [&str; 2] = ["jwt expired", "token expired"];

/// Error returned by every proxy route
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status {status})")]
pub struct ProxyError {
    /// Status code sent back to the caller
    pub status: StatusCode,

    /// Client-facing message
    pub message: String,
}

/// What is known about a failed upstream exchange
#[derive(Debug, Default, Clone)]
pub struct UpstreamFailure {
    /// Status of the backend reply, if one was received
    pub status: Option<u16>,

    /// Body of the backend reply, if one was received and was not empty
    pub body: Option<Value>,

    /// Message of a failure that produced no reply (transport or parse error)
    pub cause: Option<String>,
}

impl UpstreamFailure {
    /// A backend reply with a non-success status
    pub fn response(status: u16, text: &str) -> Self {
        Self {
            status: Some(status),
            body: parse_body(text),
            cause: None,
        }
    }

    /// A failure that produced no backend reply
    pub fn cause<T: std::fmt::Display>(cause: T) -> Self {
        Self {
            cause: Some(cause.to_string()),
            ..Default::default()
        }
    }
}

impl ProxyError {
    /// Create an error, applying the session-expiry rewrite
    pub fn new<T: Into<String>>(status: StatusCode, message: T) -> Self {
        let message = message.into();
        if is_expiry_message(&message) {
            return Self {
                status: StatusCode::UNAUTHORIZED,
                message: SESSION_EXPIRED_MESSAGE.to_string(),
            };
        }
        Self { status, message }
    }

    /// The fixed configuration error answered when no backend URL is set
    pub fn missing_backend() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!(
                "Backend URL not configured. Please set {} in your environment",
                BACKEND_URL_ENV
            ),
        }
    }

    /// Normalize an upstream failure.
    ///
    /// A message found in the reply body wins. A reply without one gets
    /// `default_message`. The cause is only used when no reply was received.
    pub fn from_upstream(failure: UpstreamFailure, default_message: &str) -> Self {
        let status = failure
            .status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let extracted = failure.body.as_ref().and_then(extract_message);
        let fallback = match failure.status {
            Some(_) => None,
            None => failure.cause.filter(|cause| !cause.is_empty()),
        };
        let message = extracted
            .or(fallback)
            .unwrap_or_else(|| default_message.to_string());

        Self::new(status, message)
    }

    /// Normalize a failure that happened before the backend was reached
    pub fn local<T: std::fmt::Display>(cause: T, default_message: &str) -> Self {
        Self::from_upstream(UpstreamFailure::cause(cause), default_message)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Pick the client-facing message out of a backend error body.
///
/// Precedence: first entry of an `errors` array, then a `message` field,
/// then the body itself when it is a plain string.
pub fn extract_message(body: &Value) -> Option<String> {
    if let Some(first) = body
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        let message = match first {
            Value::String(text) => Some(text.clone()),
            other => other.get("message").and_then(Value::as_str).map(str::to_string),
        };
        if message.is_some() {
            return message;
        }
    }

    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    match body {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn is_expiry_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    EXPIRY_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Bodies that are not JSON are kept as plain strings
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_array_wins() {
        let failure = UpstreamFailure::response(
            400,
            r#"{"success":false,"errors":[{"message":"X"},{"message":"ignored"}],"message":"Y"}"#,
        );
        let error = ProxyError::from_upstream(failure, "Request failed");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "X");
    }

    #[test]
    fn test_message_field() {
        let error = ProxyError::from_upstream(
            UpstreamFailure::response(404, r#"{"message":"Y"}"#),
            "Request failed",
        );
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.message, "Y");
    }

    #[test]
    fn test_plain_string_body() {
        let error = ProxyError::from_upstream(UpstreamFailure::response(502, "Z"), "Request failed");
        assert_eq!(error.status, StatusCode::BAD_GATEWAY);
        assert_eq!(error.message, "Z");
    }

    #[test]
    fn test_empty_errors_array_falls_through() {
        let error = ProxyError::from_upstream(
            UpstreamFailure::response(422, r#"{"errors":[],"message":"fallback"}"#),
            "Request failed",
        );
        assert_eq!(error.message, "fallback");
    }

    #[test]
    fn test_unrecognized_body_uses_route_default() {
        let error = ProxyError::from_upstream(
            UpstreamFailure::response(500, r#"{"detail":"nope"}"#),
            "Failed to fetch courses",
        );
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Failed to fetch courses");
    }

    #[test]
    fn test_empty_reply_uses_route_default() {
        let error = ProxyError::from_upstream(UpstreamFailure::response(503, ""), "Failed to rate track");
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.message, "Failed to rate track");
    }

    #[test]
    fn test_transport_failure_uses_cause() {
        let error = ProxyError::local("connection refused", "Failed to fetch tracks");
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "connection refused");
    }

    #[test]
    fn test_default_message_when_nothing_else() {
        let error = ProxyError::from_upstream(UpstreamFailure::default(), "Login failed");
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Login failed");
    }

    #[test]
    fn test_jwt_expired_forces_unauthorized() {
        let error = ProxyError::from_upstream(
            UpstreamFailure::response(500, r#"{"message":"JWT Expired at 2024-01-01"}"#),
            "Failed to fetch tracks",
        );
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.message, SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_token_expired_in_cause() {
        let error = ProxyError::local("upstream said: token expired", "Failed");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.message, SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_missing_backend_names_variable() {
        let error = ProxyError::missing_backend();
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.message.contains(BACKEND_URL_ENV));
    }
}
