//! Education Platform Admin Console
//!
//! Client state layer for the admin console: one store per backend resource
//! (courses, learners, invoices, tracks) plus the auth store owning the
//! signed-in session. Every store talks to the proxy routes through a single
//! shared [`client::ApiClient`].

pub mod auth;
pub mod client;
pub mod config;
pub mod courses;
pub mod error;
pub mod fetch;
pub mod invoices;
pub mod learners;
pub mod payload;
pub mod resource;
pub mod session;
pub mod tracks;

use std::sync::Arc;

use crate::auth::AuthStore;
use crate::client::ApiClient;
use crate::config::{ClientOptions, PROXY_URL_ENV};
use crate::courses::CoursesStore;
use crate::error::Error;
use crate::invoices::InvoicesStore;
use crate::learners::LearnersStore;
use crate::session::{FileStorage, SessionHandle, SessionStorage};
use crate::tracks::TracksStore;

pub use crate::error::Result;

/// The stores of the admin console, built once at start-up and shared by
/// reference.
#[derive(Debug)]
pub struct Console {
    client: ApiClient,
    auth: AuthStore,
    courses: CoursesStore,
    learners: LearnersStore,
    invoices: InvoicesStore,
    tracks: TracksStore,
    options: ClientOptions,
}

impl Console {
    /// Create the console for a proxy base URL
    ///
    /// # Arguments
    ///
    /// * `proxy_url` - Base URL the proxy routes are served from
    /// * `storage` - Where the session is persisted between runs
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use edu_admin::{auth::AuthStatus, session::MemoryStorage, Console};
    ///
    /// let console = Console::new("http://localhost:3000", Arc::new(MemoryStorage::new())).unwrap();
    /// assert_eq!(console.auth().status(), AuthStatus::Anonymous);
    /// ```
    pub fn new(proxy_url: &str, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        Self::new_with_options(proxy_url, storage, ClientOptions::default())
    }

    /// Create the console with custom options
    ///
    /// The session is rehydrated from `storage` before this returns; no
    /// request is made.
    pub fn new_with_options(
        proxy_url: &str,
        storage: Arc<dyn SessionStorage>,
        options: ClientOptions,
    ) -> Result<Self> {
        let session = SessionHandle::new(storage);
        let client = ApiClient::new(proxy_url, session, &options)?;
        let page_size = options.page_size;

        Ok(Self {
            auth: AuthStore::new(client.clone()),
            courses: CoursesStore::new(client.clone(), page_size),
            learners: LearnersStore::new(client.clone(), page_size),
            invoices: InvoicesStore::new(client.clone(), page_size),
            tracks: TracksStore::new(client.clone(), page_size),
            client,
            options,
        })
    }

    /// Create the console from `EDU_ADMIN_PROXY_URL`, persisting the session
    /// in the platform data directory
    pub fn from_env() -> Result<Self> {
        let proxy_url = std::env::var(PROXY_URL_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", PROXY_URL_ENV)))?;
        let storage = FileStorage::default_location()?;
        Self::new(&proxy_url, Arc::new(storage))
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn courses(&self) -> &CoursesStore {
        &self.courses
    }

    pub fn learners(&self) -> &LearnersStore {
        &self.learners
    }

    pub fn invoices(&self) -> &InvoicesStore {
        &self.invoices
    }

    pub fn tracks(&self) -> &TracksStore {
        &self.tracks
    }

    /// The session shared by every store
    pub fn session(&self) -> &SessionHandle {
        self.client.session()
    }

    /// The request-building client shared by every store
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthStatus, Credentials, OtpRequest, SignupInfo};
    pub use crate::client::Access;
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::payload::{FormPayload, Payload};
    pub use crate::resource::{Entity, Resource};
    pub use crate::session::{FileStorage, MemoryStorage, SessionStorage};
    pub use crate::tracks::RatingInput;
    pub use crate::Console;
}
