//! Configuration options for the proxy server

use std::time::Duration;

/// Environment variable holding the backend base URL
pub const BACKEND_URL_ENV: &str = "API_BASE_URL";

/// Environment variable holding the listen address
pub const BIND_ADDR_ENV: &str = "PROXY_BIND_ADDR";

/// Environment variable holding the upstream request timeout in seconds
pub const REQUEST_TIMEOUT_ENV: &str = "PROXY_REQUEST_TIMEOUT_SECS";

/// Environment variable holding the largest accepted request body in bytes
pub const MAX_UPLOAD_ENV: &str = "PROXY_MAX_UPLOAD_BYTES";

/// Configuration options for the proxy server
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL of the backend API. Routes answer a configuration error while unset.
    pub backend_url: Option<String>,

    /// Address the server listens on
    pub bind_addr: String,

    /// Timeout applied to every upstream request
    pub request_timeout: Option<Duration>,

    /// Largest request body accepted, multipart uploads included
    pub max_upload_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            bind_addr: "127.0.0.1:3000".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ProxyConfig {
    /// Build the configuration from environment variables, keeping defaults
    /// for anything unset or unparsable
    pub fn from_env() -> Self {
        let mut config = Self::default().with_backend_url(std::env::var(BACKEND_URL_ENV).ok());

        if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
            if !addr.trim().is_empty() {
                config.bind_addr = addr;
            }
        }
        if let Some(secs) = std::env::var(REQUEST_TIMEOUT_ENV)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(bytes) = std::env::var(MAX_UPLOAD_ENV)
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
        {
            config.max_upload_bytes = bytes;
        }

        config
    }

    /// Set the backend base URL. Blank values count as unset and a trailing
    /// slash is dropped.
    pub fn with_backend_url<T: Into<String>>(mut self, value: Option<T>) -> Self {
        self.backend_url = value
            .map(Into::into)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        self
    }

    /// Set the listen address
    pub fn with_bind_addr(mut self, value: &str) -> Self {
        self.bind_addr = value.to_string();
        self
    }

    /// Set the upstream request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the largest accepted request body
    pub fn with_max_upload_bytes(mut self, value: usize) -> Self {
        self.max_upload_bytes = value;
        self
    }
}
