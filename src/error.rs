//! Error handling for the admin console client

use std::fmt;
use thiserror::Error;

/// Notice surfaced when the proxy reports an expired or rejected session
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Unified error type for the admin console client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A proxy route answered with a failure
    #[error("{message}")]
    Api {
        /// HTTP status of the proxy reply
        status: u16,
        /// Message taken from the `error` field, or the operation's default
        message: String,
    },

    /// The session was rejected and has been cleared
    #[error("{0}")]
    SessionExpired(String),

    /// Authentication errors raised locally, such as a missing token
    #[error("{0}")]
    Auth(String),

    /// Required input missing or malformed, caught before any request
    #[error("{0}")]
    Validation(String),

    /// A response did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Session persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new decode error
    pub fn decode<T: fmt::Display>(msg: T) -> Self {
        Error::Decode(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create the error raised after a 401 cleared the session
    pub fn session_expired() -> Self {
        Error::SessionExpired(SESSION_EXPIRED_MESSAGE.to_string())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::SessionExpired(_) => Some(401),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure ended the session
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired(_))
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
