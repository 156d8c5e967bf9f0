//! Configuration options for the admin console client

use std::time::Duration;

/// Environment variable holding the proxy base URL
pub const PROXY_URL_ENV: &str = "EDU_ADMIN_PROXY_URL";

/// Configuration options for the admin console client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Rows per page for paginated table views
    pub page_size: usize,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            page_size: 10,
            user_agent: format!("edu-admin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the page size. Zero is treated as one.
    pub fn with_page_size(mut self, value: usize) -> Self {
        self.page_size = value.max(1);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, value: &str) -> Self {
        self.user_agent = value.to_string();
        self
    }
}
