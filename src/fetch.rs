//! HTTP request builder used for every call to the proxy routes

use reqwest::{header::{HeaderMap, HeaderValue}, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::payload::FormPayload;

/// Body attached to a request
#[derive(Debug, Clone)]
enum Body {
    Json(Vec<u8>),
    Form(FormPayload),
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Body>,
    failure_message: String,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        Self {
            client,
            url: url.to_string(),
            method,
            headers: HeaderMap::new(),
            body: None,
            failure_message: "Request failed".to_string(),
        }
    }

    /// Add a header to the request. A value that is not a valid header
    /// value fails with [`Error::Config`] instead of being dropped.
    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self, Error> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            warn!("invalid value for header {}: {}", name, e);
            Error::Config(format!("Invalid value for header {}", name))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Result<Self, Error> {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Add a multipart body to the request
    pub fn form(mut self, form: FormPayload) -> Self {
        self.body = Some(Body::Form(form));
        self
    }

    /// Message reported when the reply carries no usable `error` field
    pub fn failure_message(mut self, message: &str) -> Self {
        self.failure_message = message.to_string();
        self
    }

    /// Method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL of the request
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder, Error> {
        let url = Url::parse(&self.url)?;

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        req = match &self.body {
            Some(Body::Json(json)) => req
                .header("Content-Type", "application/json")
                .body(json.clone()),
            Some(Body::Form(form)) => req.multipart(form.to_multipart()?),
            None => req.header("Content-Type", "application/json"),
        };

        Ok(req)
    }

    /// Execute the request and parse the response as JSON.
    ///
    /// A non-success reply becomes [`Error::Api`] carrying the reply's
    /// `error` field, or the failure message when there is none. An empty
    /// success body parses as JSON `null`.
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let req = self.build()?;
        debug!("{} {}", self.method, self.url);
        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&text).unwrap_or_else(|| self.failure_message.clone()),
            });
        }

        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        let result = serde_json::from_str::<T>(body)?;
        Ok(result)
    }
}

/// The `error` field of a proxy failure body
fn error_message(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("error")?
        .as_str()
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
