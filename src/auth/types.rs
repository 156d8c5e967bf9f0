//! Types for the authentication routes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::session::BackendUser;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Email and password for `POST /api/auth/login`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check that both fields are filled in
    pub fn validate(&self) -> Result<()> {
        require("Email", &self.email)?;
        require("Password", &self.password)
    }
}

/// Staff registration for `POST /api/auth/signup`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupInfo {
    /// Check required fields, password length and confirmation
    pub fn validate(&self) -> Result<()> {
        require("First name", &self.first_name)?;
        require("Last name", &self.last_name)?;
        require("Email", &self.email)?;
        require("Contact", &self.contact)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if self.password != self.confirm_password {
            return Err(Error::validation("Passwords do not match"));
        }
        Ok(())
    }
}

/// One-time code for `POST /api/auth/otp`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtpRequest {
    pub token: String,
}

impl OtpRequest {
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self { token: token.into() }
    }

    pub fn validate(&self) -> Result<()> {
        require("Token", &self.token)
    }
}

/// Reply to login and signup
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for later requests
    pub token: String,

    /// The signed-in user
    pub user: BackendUser,
}

/// Reply to OTP verification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtpResponse {
    /// Updated user fields, merged onto the current profile
    #[serde(default)]
    pub user: Option<Map<String, Value>>,
}

/// Where the signed-in staff member is in the sign-up flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// No complete session
    Anonymous,
    /// Signed in, email not yet verified
    Unverified,
    /// Signed in with a verified email
    Verified,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signup() -> SignupInfo {
        SignupInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            contact: "+44 20 7946 0000".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(Credentials::new("a@example.com", "pw").validate().is_ok());

        let err = Credentials::new("a@example.com", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "Password is required");

        let err = Credentials::new("  ", "pw").validate().unwrap_err();
        assert_eq!(err.to_string(), "Email is required");
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup().validate().is_ok());

        let short = SignupInfo {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..signup()
        };
        assert_eq!(short.validate().unwrap_err().to_string(), "Password must be at least 6 characters");

        let mismatch = SignupInfo {
            confirm_password: "secret2".to_string(),
            ..signup()
        };
        assert_eq!(mismatch.validate().unwrap_err().to_string(), "Passwords do not match");

        let no_contact = SignupInfo {
            contact: String::new(),
            ..signup()
        };
        assert_eq!(no_contact.validate().unwrap_err().to_string(), "Contact is required");
    }

    #[test]
    fn test_signup_body_is_camel_case() {
        let body = serde_json::to_value(signup()).unwrap();
        assert_eq!(body["firstName"], json!("Ada"));
        assert_eq!(body["confirmPassword"], json!("secret1"));
    }

    #[test]
    fn test_otp_requires_token() {
        assert!(OtpRequest::new("123456").validate().is_ok());
        assert!(matches!(OtpRequest::new("").validate(), Err(Error::Validation(_))));
    }
}
