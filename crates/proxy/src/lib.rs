//! Proxy routes for the education platform admin console
//!
//! Each route forwards one resource-and-verb pair to the backend API,
//! re-attaching the caller's bearer token where the resource requires it and
//! turning every failure into a uniform `{ "error": <message> }` body.

pub mod config;
pub mod error;
pub mod form;
pub mod forward;
pub mod handlers;
pub mod routes;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ProxyConfig;
use crate::forward::Forwarder;

pub use crate::error::{ProxyError, SESSION_EXPIRED_MESSAGE};
pub use crate::routes::build_router;

/// State shared by every route
pub struct ProxyState {
    /// Client for the backend API
    pub forwarder: Forwarder,

    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl ProxyState {
    /// Create the shared state from the proxy configuration
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            forwarder: Forwarder::new(config)?,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

/// Proxy HTTP server
pub struct ProxyServer {
    state: Arc<ProxyState>,
    addr: String,
}

impl ProxyServer {
    /// Create a new server from the proxy configuration
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            state: Arc::new(ProxyState::new(config)?),
            addr: config.bind_addr.clone(),
        })
    }

    /// Start the server and run until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let router = build_router(self.state);

        let listener = TcpListener::bind(&self.addr).await?;
        info!("admin proxy listening on {}", self.addr);

        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ProxyConfig;
    pub use crate::error::ProxyError;
    pub use crate::{build_router, ProxyServer, ProxyState};
}
