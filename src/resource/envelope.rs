//! Decoding of proxy payloads that may or may not wrap the resource

use serde_json::Value;

use super::entity::{kind, Entity};
use crate::error::{Error, Result};

/// A proxy payload, either wrapped under a named key (`{ "tracks": [...] }`)
/// or the resource itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The value found under the key
    Wrapped(Value),
    /// The payload as received
    Bare(Value),
}

impl Envelope {
    /// Look for `key` in the payload. A missing or null key means the payload
    /// is bare.
    pub fn open(payload: Value, key: &str) -> Self {
        match payload {
            Value::Object(mut map) => match map.remove(key) {
                Some(inner) if !inner.is_null() => Envelope::Wrapped(inner),
                Some(inner) => {
                    map.insert(key.to_string(), inner);
                    Envelope::Bare(Value::Object(map))
                }
                None => Envelope::Bare(Value::Object(map)),
            },
            other => Envelope::Bare(other),
        }
    }

    /// The payload after unwrapping
    pub fn into_inner(self) -> Value {
        match self {
            Envelope::Wrapped(value) | Envelope::Bare(value) => value,
        }
    }

    /// Decode a list of entities. The unwrapped payload must be an array of
    /// objects.
    pub fn into_list(self) -> Result<Vec<Entity>> {
        match self.into_inner() {
            Value::Array(items) => items.into_iter().map(Entity::try_from).collect(),
            other => Err(Error::decode(format!("expected a list, got {}", kind(&other)))),
        }
    }

    /// Decode a single entity
    pub fn into_entity(self) -> Result<Entity> {
        Entity::try_from(self.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_and_bare_lists() {
        let wrapped = Envelope::open(json!({ "tracks": [{ "_id": "1" }, { "_id": "2" }] }), "tracks");
        assert!(matches!(wrapped, Envelope::Wrapped(_)));
        assert_eq!(wrapped.into_list().unwrap().len(), 2);

        let bare = Envelope::open(json!([{ "_id": "1" }]), "tracks");
        assert!(matches!(bare, Envelope::Bare(_)));
        assert_eq!(bare.into_list().unwrap().len(), 1);
    }

    #[test]
    fn test_object_without_key_is_not_a_list() {
        let result = Envelope::open(json!({ "message": "ok" }), "courses").into_list();
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_single_entity_falls_back_to_payload() {
        let entity = Envelope::open(json!({ "_id": "c1", "course": null, "title": "Rust" }), "course")
            .into_entity()
            .unwrap();
        assert_eq!(entity.id(), Some("c1"));
        assert_eq!(entity.text("title").as_deref(), Some("Rust"));
    }
}
