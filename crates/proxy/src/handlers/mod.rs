//! Route handlers, one per resource-and-verb pair

pub mod auth;
pub mod courses;
pub mod invoices;
pub mod learners;
pub mod tracks;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::Json;
use serde_json::Value;
use tracing::warn;

use crate::error::ProxyError;

/// Result type shared by every handler
pub type ProxyResult = Result<Json<Value>, ProxyError>;

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Characters that would let an id escape its path segment
const UNSAFE_ID_CHARS: [char; 5] = ['/', '\\', '?', '#', '%'];

/// Backend path of one entity of a collection, e.g. `/api/courses/<id>`.
///
/// The id must stay a single segment: ids that are empty, `.` or `..`, or
/// that contain a separator, query, fragment or escape character are
/// answered with a 400.
pub(crate) fn item_path(collection: &str, id: &str) -> Result<String, ProxyError> {
    let unsafe_id = matches!(id, "" | "." | "..") || id.contains(UNSAFE_ID_CHARS);
    if unsafe_id {
        warn!("rejected id {:?} for {}", id, collection);
        return Err(ProxyError::new(StatusCode::BAD_REQUEST, "Invalid id"));
    }
    Ok(format!("{}/{}", collection, id))
}

/// Read an incoming JSON body buffered by the `Bytes` extractor.
///
/// Call this after the backend check so that a missing backend wins over an
/// oversized or unreadable body. Extractor rejections keep their status and
/// are rendered in the `{ "error" }` shape.
pub(crate) fn read_json(
    body: Result<Bytes, BytesRejection>,
    default_message: &str,
) -> Result<Value, ProxyError> {
    let body = body.map_err(|rejection| ProxyError::new(rejection.status(), rejection.body_text()))?;
    parse_json(&body, default_message)
}

/// Parse an incoming JSON body. An empty body reads as `null`.
pub(crate) fn parse_json(body: &Bytes, default_message: &str) -> Result<Value, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ProxyError::local(e, default_message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        let error = parse_json(&Bytes::from_static(b"{not json"), "Login failed").unwrap_err();
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn test_item_path_keeps_plain_ids() {
        assert_eq!(
            item_path("/api/courses", "65f1c0ffee").unwrap(),
            "/api/courses/65f1c0ffee"
        );
        assert_eq!(item_path("/api/tracks", "a..b").unwrap(), "/api/tracks/a..b");
    }

    #[test]
    fn test_item_path_rejects_escaping_ids() {
        for id in ["", ".", "..", "../../admin/users?all=1", "a/b", "a\\b", "a?b", "a#b", "a%2Fb"] {
            let error = item_path("/api/courses", id).unwrap_err();
            assert_eq!(error.status, StatusCode::BAD_REQUEST, "{:?}", id);
            assert_eq!(error.message, "Invalid id");
        }
    }
}
