//! Types for the signed-in identity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Profile keys that are not optional
const NON_NULL_KEYS: [&str; 6] = ["id", "email", "firstName", "lastName", "role", "isVerified"];

/// Profile of the signed-in staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user ID
    pub id: String,

    /// The user's email address
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    /// The user's role
    #[serde(default)]
    pub role: String,

    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Whether the email address has been verified
    #[serde(default)]
    pub is_verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_token_expires_at: Option<String>,

    /// The last sign-in time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,

    /// The creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// The update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Fields the console does not model, kept so merges lose nothing
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User object as returned by the backend, keyed by `_id`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    #[serde(rename = "_id", default)]
    pub mongo_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub verification_token: Option<String>,
    #[serde(default)]
    pub verification_token_expires_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TryFrom<BackendUser> for UserProfile {
    type Error = Error;

    fn try_from(user: BackendUser) -> Result<Self> {
        let id = user
            .mongo_id
            .or(user.id)
            .ok_or_else(|| Error::decode("user object has no id"))?;

        Ok(Self {
            id,
            email: user.email.unwrap_or_default(),
            first_name: user.first_name.unwrap_or_default(),
            last_name: user.last_name.unwrap_or_default(),
            role: user.role.unwrap_or_default(),
            contact: user.contact,
            is_verified: user.is_verified.unwrap_or(false),
            verification_token: user.verification_token,
            verification_token_expires_at: user.verification_token_expires_at,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
            extra: Map::new(),
        })
    }
}

impl UserProfile {
    /// Full display name, falling back to the email address
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Shallow-merge backend fields onto this profile.
    ///
    /// Top-level keys in `fields` overwrite the profile's own; everything
    /// else is kept. A null clears an optional field. Fields the profile
    /// cannot go without keep their value when the backend sends null.
    pub fn merged(&self, fields: &Map<String, Value>) -> Result<Self> {
        let mut current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(Error::decode("profile did not serialize to an object")),
        };
        for (key, value) in fields {
            if value.is_null() && NON_NULL_KEYS.contains(&key.as_str()) {
                continue;
            }
            current.insert(key.clone(), value.clone());
        }
        Ok(serde_json::from_value(Value::Object(current))?)
    }
}
