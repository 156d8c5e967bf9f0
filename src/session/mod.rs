//! Session management for the signed-in staff member
//!
//! The in-memory [`Session`] is authoritative. A copy is kept in a
//! [`SessionStorage`] so the session survives restarts.

mod storage;
mod types;

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

pub use storage::*;
pub use types::*;

/// Identity and bearer token shared by every store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// The signed-in user
    pub user: Option<UserProfile>,

    /// The bearer token
    pub token: Option<String>,
}

impl Session {
    /// Only a session holding both a user and a token counts as signed in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Shared handle to the session and its persisted copy.
///
/// Cloning the handle shares the same session.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<RwLock<Session>>,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Create a handle, rehydrating the session from storage.
    ///
    /// No network call is made. Unreadable stored data yields an empty session.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let session = read_stored(storage.as_ref());
        Self {
            session: Arc::new(RwLock::new(session)),
            storage,
        }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current bearer token, read at call time
    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    /// Current user profile
    pub fn user(&self) -> Option<UserProfile> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Set user and token together and persist them
    pub fn establish(&self, user: UserProfile, token: String) {
        info!("session established for {}", user.email);
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        session.user = Some(user);
        session.token = Some(token);
        self.persist(&session);
    }

    /// Replace the user profile, keeping the token, and persist the result
    pub fn replace_user(&self, user: UserProfile) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        session.user = Some(user);
        self.persist(&session);
    }

    /// Clear the session and its persisted copy. Clearing twice is harmless.
    pub fn clear(&self) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if session.user.is_some() || session.token.is_some() {
            info!("session cleared");
        }
        *session = Session::default();
        self.persist(&session);
    }

    /// Re-read the session from storage, discarding the in-memory copy
    pub fn reload(&self) {
        let stored = read_stored(self.storage.as_ref());
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = stored;
    }

    /// Write both keys when user and token are present, otherwise remove both.
    /// Failures are logged; the in-memory session stays authoritative.
    fn persist(&self, session: &Session) {
        let result = match (&session.user, &session.token) {
            (Some(user), Some(token)) => serde_json::to_string(user)
                .map_err(crate::error::Error::from)
                .and_then(|json| self.storage.set(USER_KEY, &json))
                .and_then(|_| self.storage.set(TOKEN_KEY, token)),
            _ => self
                .storage
                .remove(USER_KEY)
                .and_then(|_| self.storage.remove(TOKEN_KEY)),
        };

        if let Err(e) = result {
            warn!("failed to persist session: {}", e);
        }
    }
}

fn read_stored(storage: &dyn SessionStorage) -> Session {
    let user = match storage.get(USER_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<UserProfile>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("discarding unreadable stored session: {}", e);
                return Session::default();
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("failed to read stored session: {}", e);
            return Session::default();
        }
    };

    let token = match storage.get(TOKEN_KEY) {
        Ok(token) => token.filter(|token| !token.is_empty()),
        Err(e) => {
            warn!("failed to read stored session: {}", e);
            return Session::default();
        }
    };

    Session { user, token }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: "admin".to_string(),
            contact: None,
            is_verified: true,
            verification_token: None,
            verification_token_expires_at: None,
            last_login: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_establish_persists_both_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let handle = SessionHandle::new(storage.clone());

        handle.establish(profile(), "tok".to_string());

        assert!(handle.snapshot().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert!(storage.get(USER_KEY).unwrap().unwrap().contains("\"firstName\":\"Ada\""));
    }

    #[test]
    fn test_rehydrates_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        SessionHandle::new(storage.clone()).establish(profile(), "tok".to_string());

        let rehydrated = SessionHandle::new(storage);
        assert_eq!(rehydrated.token().as_deref(), Some("tok"));
        assert_eq!(rehydrated.user(), Some(profile()));
    }

    #[test]
    fn test_corrupt_user_rehydrates_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(USER_KEY, "{not json").unwrap();
        storage.set(TOKEN_KEY, "tok").unwrap();

        let handle = SessionHandle::new(storage);
        assert_eq!(handle.snapshot(), Session::default());
    }

    #[test]
    fn test_partial_session_is_not_authenticated() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tok").unwrap();

        let handle = SessionHandle::new(storage);
        assert_eq!(handle.token().as_deref(), Some("tok"));
        assert!(!handle.snapshot().is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let handle = SessionHandle::new(storage.clone());
        handle.establish(profile(), "tok".to_string());

        handle.clear();
        handle.clear();

        assert_eq!(handle.snapshot(), Session::default());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }
}
