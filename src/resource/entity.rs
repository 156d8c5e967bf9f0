//! Schemaless records mirrored from the backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Placeholder shown for fields the backend did not send
pub const MISSING: &str = "N/A";

/// A course, learner, track, invoice or rating as sent by the backend.
///
/// Entities have no client-side schema; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Wrap a JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Identifier of the entity: `_id`, falling back to `id`
    pub fn id(&self) -> Option<&str> {
        self.0
            .get("_id")
            .and_then(Value::as_str)
            .or_else(|| self.0.get("id").and_then(Value::as_str))
    }

    /// Whether the entity carries the given id
    pub fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// Top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field reached through embedded objects, e.g. `track.title`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.0.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.get(key))
    }

    /// Numeric field. Numeric strings are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Field rendered as text, if it is a non-empty scalar
    pub fn text(&self, path: &str) -> Option<String> {
        match self.get_path(path)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Field rendered as text, or `"N/A"`
    pub fn text_or_missing(&self, path: &str) -> String {
        self.text(path).unwrap_or_else(|| MISSING.to_string())
    }

    /// `name`, else `title`, else `"Untitled <label>"`
    pub fn display_name(&self, label: &str) -> String {
        self.text("name")
            .or_else(|| self.text("title"))
            .unwrap_or_else(|| format!("Untitled {}", label))
    }

    /// Copy of the entity with `fields` written over its own
    pub fn with_fields(&self, fields: &Map<String, Value>) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// The underlying JSON object
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the entity, returning the JSON object
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Entity {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::decode(format!("expected an object, got {}", kind(&other)))),
        }
    }
}

/// Short name of a JSON value's type, for decode errors
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        Entity::try_from(value).unwrap()
    }

    #[test]
    fn test_id_prefers_mongo_id() {
        assert_eq!(entity(json!({ "_id": "a", "id": "b" })).id(), Some("a"));
        assert_eq!(entity(json!({ "id": "b" })).id(), Some("b"));
        assert_eq!(entity(json!({ "name": "x" })).id(), None);
    }

    #[test]
    fn test_placeholders() {
        let course = entity(json!({
            "title": "Rust 101",
            "price": 49,
            "track": { "name": "Systems" },
            "instructor": ""
        }));

        assert_eq!(course.display_name("Course"), "Rust 101");
        assert_eq!(course.text_or_missing("price"), "49");
        assert_eq!(course.text_or_missing("track.name"), "Systems");
        assert_eq!(course.text_or_missing("instructor"), MISSING);
        assert_eq!(entity(json!({})).display_name("Track"), "Untitled Track");
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let invoice = entity(json!({ "amount": "150.5", "total": 200, "status": "paid" }));
        assert_eq!(invoice.number("amount"), Some(150.5));
        assert_eq!(invoice.number("total"), Some(200.0));
        assert_eq!(invoice.number("status"), None);
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(matches!(Entity::try_from(json!([1, 2])), Err(Error::Decode(_))));
    }
}
