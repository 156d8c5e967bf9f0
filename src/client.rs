//! Request-building collaborator shared by every store

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::fetch::FetchBuilder;
use crate::session::SessionHandle;

/// Whether a route receives the session's bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sent without credentials
    Public,
    /// Sent with `Authorization: Bearer <token>` when a token is present
    Bearer,
}

/// Client for the proxy routes.
///
/// Reads the session token each time a request is built, so a request built
/// after a logout carries no token. A 401 reply on a bearer route clears the
/// session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
    session: SessionHandle,
}

impl ApiClient {
    /// Create a new ApiClient
    pub fn new(base_url: &str, session: SessionHandle, options: &ClientOptions) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", base_url)));
        }
        // Routes are joined relative to the base, which needs a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(options.user_agent.clone());
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http_client: builder.build()?,
            session,
        })
    }

    /// The session shared with the stores
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Resolve a proxy route such as `/api/courses`
    pub fn endpoint(&self, path: &str) -> Result<String> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?.to_string())
    }

    /// Start a request to a proxy route
    pub fn request(&self, method: Method, path: &str, access: Access) -> Result<FetchBuilder<'_>> {
        let url = self.endpoint(path)?;
        let builder = FetchBuilder::new(&self.http_client, &url, method);

        match (access, self.session.token()) {
            (Access::Bearer, Some(token)) => builder.bearer_auth(&token),
            _ => Ok(builder),
        }
    }

    /// Execute a request built by [`ApiClient::request`].
    ///
    /// On a 401 for a bearer route the session is cleared and
    /// [`Error::SessionExpired`] is returned.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        builder: FetchBuilder<'_>,
        access: Access,
    ) -> Result<T> {
        match builder.execute::<T>().await {
            Err(Error::Api { status: 401, message }) if access == Access::Bearer => {
                warn!("{} {} rejected the session: {}", builder.method(), builder.url(), message);
                self.session.clear();
                Err(Error::session_expired())
            }
            Err(e) => {
                warn!("{} {} failed: {}", builder.method(), builder.url(), e);
                Err(e)
            }
            ok => ok,
        }
    }
}
