//! Transport layer for the OneView REST API.
//!
//! The resource client depends on the appliance only through the
//! [`Connection`] trait: plain reads return a body, mutating calls return an
//! [`Outcome`] that is either a finished body or a reference to a task that
//! is still running. [`HttpConnection`] is the reqwest implementation.
//!
//! There is no retry logic here; a failed exchange propagates immediately.
//!
//! # Security
//!
//! The session id is never logged. HTTP error bodies are sanitized and
//! truncated before they are stored in an error.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{OneViewError, Result};
use crate::models::{Task, TaskRef};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Extra HTTP headers for a single call, e.g. `exportOnly` or `Accept-Language`.
pub type CustomHeaders = BTreeMap<String, String>;

/// Result of a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The appliance started an asynchronous task.
    Task(TaskRef),
    /// The call finished synchronously; `Value::Null` when there was no content.
    Body(Value),
}

impl Outcome {
    /// Returns true for a synchronous response with no content.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Body(Value::Null))
    }
}

/// The send/receive contract the resource client needs from a transport.
///
/// Implementations must be safe to share across concurrent calls.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Reads the resource at `uri`. Also used to poll tasks.
    async fn get(&self, uri: &str) -> Result<Value>;

    /// POSTs `body` (or nothing) to `uri`.
    async fn post(&self, uri: &str, body: Option<&Value>, headers: &CustomHeaders) -> Result<Outcome>;

    /// PUTs `body` (or nothing) to `uri`.
    async fn put(&self, uri: &str, body: Option<&Value>, headers: &CustomHeaders) -> Result<Outcome>;

    /// DELETEs the resource at `uri`.
    async fn delete(&self, uri: &str, headers: &CustomHeaders) -> Result<Outcome>;

    /// PATCHes `uri` with a list of operations.
    async fn patch(&self, uri: &str, operations: &Value, headers: &CustomHeaders) -> Result<Outcome>;
}

/// reqwest-backed [`Connection`] to a OneView appliance.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let connection = HttpConnection::new(&config)?;
///
/// let networks = connection.get("/rest/fc-networks").await?;
/// ```
#[derive(Clone)]
pub struct HttpConnection {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Appliance base URL without trailing slash.
    base_url: String,

    /// Session id sent in the `Auth` header.
    /// SECURITY: Never log this value!
    session_id: String,

    /// Value of the `X-API-Version` header.
    api_version: u32,
}

impl HttpConnection {
    /// Creates a connection from configuration.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(OneViewError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_id: config.session_id().to_string(),
            api_version: config.api_version,
        })
    }

    /// Returns the appliance base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a resource address to a full URL.
    ///
    /// Addresses are normally paths such as `/rest/fc-networks/1`. Absolute
    /// URLs are accepted only when they point at the configured host.
    fn url_for(&self, uri: &str) -> Result<String> {
        if !uri.starts_with("http://") && !uri.starts_with("https://") {
            let separator = if uri.starts_with('/') { "" } else { "/" };
            return Ok(format!("{}{}{}", self.base_url, separator, uri));
        }

        let parsed = Url::parse(uri)
            .map_err(|e| OneViewError::invalid_argument(format!("invalid address: {}", e)))?;
        let base = Url::parse(&self.base_url)
            .map_err(|e| OneViewError::invalid_config(format!("invalid base URL: {}", e)))?;

        if parsed.host() != base.host() {
            return Err(OneViewError::invalid_argument(format!(
                "address host mismatch: expected {:?}, got {:?}",
                base.host(),
                parsed.host()
            )));
        }

        Ok(uri.to_string())
    }

    /// Sends one request and returns status, headers and body text.
    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        headers: &CustomHeaders,
    ) -> Result<(StatusCode, HeaderMap, String)> {
        let url = self.url_for(uri)?;

        tracing::debug!(method = %method, uri = %uri, "Making OneView API request");

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header("X-API-Version", self.api_version.to_string())
            .header("Accept", "application/json");

        if !self.session_id.is_empty() {
            req = req.header("Auth", &self.session_id);
        }

        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(data) = body {
            req = req.json(data);
        }

        let response = req.send().await.map_err(OneViewError::Http)?;
        let status = response.status();
        let response_headers = response.headers().clone();
        let text = response.text().await.map_err(OneViewError::Http)?;

        tracing::trace!(status = %status, body = %text, "OneView API response");

        if !status.is_success() {
            return Err(self.handle_http_error(status, uri, &text));
        }

        Ok((status, response_headers, text))
    }

    /// Converts a non-success status into an error.
    fn handle_http_error(&self, status: StatusCode, uri: &str, body: &str) -> OneViewError {
        let body = OneViewError::sanitize_message(body, &self.session_id);
        let body = if body.len() > MAX_ERROR_BODY_LEN {
            let mut end = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...[truncated]", &body[..end])
        } else {
            body
        };

        tracing::warn!(status = %status, uri = %uri, "OneView API returned an error status");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => OneViewError::Authentication,
            StatusCode::NOT_FOUND => OneViewError::not_found(uri),
            _ => OneViewError::HttpStatus { status, body },
        }
    }

    /// Sends a mutating request and classifies the response.
    async fn submit(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        headers: &CustomHeaders,
    ) -> Result<Outcome> {
        let (status, response_headers, text) = self.send(method, uri, body, headers).await?;
        let body = parse_body(&text)?;
        Ok(classify(status, &response_headers, body))
    }
}

fn parse_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(OneViewError::Serialization)
}

/// Decides whether a mutating call finished or started a task.
///
/// A 202 with a `Location` header is a task at that address. Any other
/// response whose body is a task resource is a task at the body's `uri`.
fn classify(status: StatusCode, headers: &HeaderMap, body: Value) -> Outcome {
    if status == StatusCode::ACCEPTED {
        if let Some(location) = headers.get(LOCATION).and_then(|v| v.to_str().ok()) {
            let task = TaskRef::new(location);
            return Outcome::Task(if body.is_null() { task } else { task.with_snapshot(body) });
        }
    }

    if Task::is_task_body(&body) {
        if let Some(uri) = body.get("uri").and_then(Value::as_str) {
            return Outcome::Task(TaskRef::new(uri).with_snapshot(body.clone()));
        }
    }

    Outcome::Body(body)
}

#[async_trait]
impl Connection for HttpConnection {
    async fn get(&self, uri: &str) -> Result<Value> {
        let (_, _, text) = self.send(Method::GET, uri, None, &CustomHeaders::new()).await?;
        parse_body(&text)
    }

    async fn post(&self, uri: &str, body: Option<&Value>, headers: &CustomHeaders) -> Result<Outcome> {
        self.submit(Method::POST, uri, body, headers).await
    }

    async fn put(&self, uri: &str, body: Option<&Value>, headers: &CustomHeaders) -> Result<Outcome> {
        self.submit(Method::PUT, uri, body, headers).await
    }

    async fn delete(&self, uri: &str, headers: &CustomHeaders) -> Result<Outcome> {
        self.submit(Method::DELETE, uri, None, headers).await
    }

    async fn patch(&self, uri: &str, operations: &Value, headers: &CustomHeaders) -> Result<Outcome> {
        self.submit(Method::PATCH, uri, Some(operations), headers).await
    }
}
