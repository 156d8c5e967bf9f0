//! Authentication of staff members and ownership of the session

mod types;

use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::client::{Access, ApiClient};
use crate::error::{Error, Result};
use crate::session::{BackendUser, SessionHandle, UserProfile};

pub use types::*;

/// Raised by [`AuthStore::verify_otp`] when there is no session to verify
pub const NO_TOKEN_MESSAGE: &str = "No token available. Please log in again.";

/// Progress of the auth operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Whether an operation is in flight
    pub loading: bool,

    /// Message of the last failure
    pub error: Option<String>,
}

/// Store driving login, signup, OTP verification and logout.
///
/// The session itself lives in the [`SessionHandle`] shared with every
/// other store; this store only performs the transitions.
#[derive(Debug)]
pub struct AuthStore {
    client: ApiClient,
    state: RwLock<AuthState>,
}

impl AuthStore {
    /// Create the store. The session was already rehydrated when the
    /// handle was built, so no request is made.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Sign in and establish the session
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile> {
        credentials.validate()?;
        self.run(async {
            let builder = self
                .client
                .request(Method::POST, "/api/auth/login", Access::Public)?
                .failure_message("Login failed")
                .json(credentials)?;
            let reply: AuthResponse = self.client.execute(builder, Access::Public).await?;
            self.establish(reply)
        })
        .await
    }

    /// Register a staff account and establish its (unverified) session
    pub async fn signup(&self, info: &SignupInfo) -> Result<UserProfile> {
        info.validate()?;
        self.run(async {
            let builder = self
                .client
                .request(Method::POST, "/api/auth/signup", Access::Public)?
                .failure_message("Signup failed")
                .json(info)?;
            let reply: AuthResponse = self.client.execute(builder, Access::Public).await?;
            self.establish(reply)
        })
        .await
    }

    /// Verify the emailed one-time code.
    ///
    /// Needs a token; without one this fails locally with
    /// [`NO_TOKEN_MESSAGE`]. The returned user fields are merged onto the
    /// current profile rather than replacing it.
    pub async fn verify_otp(&self, request: &OtpRequest) -> Result<UserProfile> {
        request.validate()?;
        if self.session().token().is_none() {
            return Err(Error::auth(NO_TOKEN_MESSAGE));
        }

        self.run(async {
            let builder = self
                .client
                .request(Method::POST, "/api/auth/otp", Access::Bearer)?
                .failure_message("OTP verification failed")
                .json(request)?;
            let reply: OtpResponse = self.client.execute(builder, Access::Bearer).await?;

            let profile = match (self.session().user(), reply.user) {
                (Some(user), Some(fields)) => user.merged(&fields)?,
                (Some(user), None) => user,
                (None, Some(fields)) => {
                    let backend: BackendUser = serde_json::from_value(Value::Object(fields.clone()))?;
                    UserProfile::try_from(backend)?.merged(&fields)?
                }
                (None, None) => return Err(Error::decode("verification reply has no user")),
            };

            info!("email verified for {}", profile.email);
            self.session().replace_user(profile.clone());
            Ok(profile)
        })
        .await
    }

    /// Clear the session and this store's state. Safe to call repeatedly.
    pub fn logout(&self) {
        self.session().clear();
        *self.write() = AuthState::default();
    }

    /// Re-read the session from storage
    pub fn reload(&self) {
        self.session().reload();
    }

    pub fn status(&self) -> AuthStatus {
        let session = self.session().snapshot();
        match session.user {
            Some(user) if session.token.is_some() => {
                if user.is_verified {
                    AuthStatus::Verified
                } else {
                    AuthStatus::Unverified
                }
            }
            _ => AuthStatus::Anonymous,
        }
    }

    /// True only when both a user and a token are present
    pub fn is_authenticated(&self) -> bool {
        self.session().snapshot().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session().user()
    }

    pub fn token(&self) -> Option<String> {
        self.session().token()
    }

    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// The session shared with the resource stores
    pub fn session(&self) -> &SessionHandle {
        self.client.session()
    }

    fn establish(&self, reply: AuthResponse) -> Result<UserProfile> {
        let profile = UserProfile::try_from(reply.user)?;
        self.session().establish(profile.clone(), reply.token);
        Ok(profile)
    }

    async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
        }

        let result = operation.await;

        let mut state = self.write();
        state.loading = false;
        state.error = result.as_ref().err().map(ToString::to_string);
        result
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use crate::session::MemoryStorage;
    use std::sync::Arc;

    fn store() -> AuthStore {
        let session = SessionHandle::new(Arc::new(MemoryStorage::new()));
        let client = ApiClient::new("http://localhost:3000", session, &ClientOptions::default()).unwrap();
        AuthStore::new(client)
    }

    #[tokio::test]
    async fn test_verify_otp_without_token_fails_locally() {
        let store = store();

        let err = store.verify_otp(&OtpRequest::new("123456")).await.unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(err.to_string(), NO_TOKEN_MESSAGE);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_invalid_credentials_never_reach_the_network() {
        let store = store();

        let err = store.login(&Credentials::new("", "pw")).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.state(), AuthState::default());
    }

    #[test]
    fn test_anonymous_by_default() {
        let store = store();
        assert_eq!(store.status(), AuthStatus::Anonymous);
        assert!(!store.is_authenticated());
    }
}
