//! Outbound calls from the proxy to the backend API

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{multipart, Client, Method, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, UpstreamFailure};

/// Relays requests to the backend and normalizes whatever comes back
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    backend_url: Option<Arc<str>>,
}

/// Body relayed to the backend
pub enum Outbound {
    /// No body
    Empty,
    /// JSON document sent as `application/json`
    Json(Value),
    /// Multipart form rebuilt from the incoming request
    Form(multipart::Form),
}

impl Forwarder {
    /// Create a new Forwarder from the proxy configuration
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            backend_url: config.backend_url.as_deref().map(Arc::from),
        })
    }

    /// Resolve a backend path, failing with the configuration error when no
    /// backend URL is set
    pub fn endpoint(&self, path: &str) -> Result<String, ProxyError> {
        match &self.backend_url {
            Some(base) => Ok(format!("{}{}", base, path)),
            None => {
                warn!("backend URL is not configured, rejecting {}", path);
                Err(ProxyError::missing_backend())
            }
        }
    }

    /// Fail fast with the configuration error before any body is read
    pub fn ensure_configured(&self) -> Result<(), ProxyError> {
        self.endpoint("").map(|_| ())
    }

    /// Forward a request and pass the backend's JSON payload through unchanged
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Outbound,
        default_message: &str,
    ) -> Result<Value, ProxyError> {
        let url = self.endpoint(path)?;
        debug!("forwarding {} {}", method, url);

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ProxyError::local(e, default_message))?;
            headers.insert(AUTHORIZATION, value);
        }

        let request = self.client.request(method, &url).headers(headers);
        let request = match body {
            Outbound::Empty => request.header(CONTENT_TYPE, "application/json"),
            Outbound::Json(value) => request.json(&value),
            Outbound::Form(form) => request.multipart(form),
        };

        Self::dispatch(request, default_message).await
    }

    async fn dispatch(request: RequestBuilder, default_message: &str) -> Result<Value, ProxyError> {
        let response = request.send().await.map_err(|e| {
            warn!("backend unreachable: {}", e);
            ProxyError::local(e, default_message)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProxyError::local(e, default_message))?;

        if !status.is_success() {
            warn!("backend answered {}: {}", status, text);
            return Err(ProxyError::from_upstream(
                UpstreamFailure::response(status.as_u16(), &text),
                default_message,
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ProxyError::local(e, default_message))
    }
}
