//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one shared HTTP client with the configured user agent and headers
//! - GET requests for listing and article pages
//! - Error classification (status, timeout, connection, body)
//!
//! The fetcher never retries; retry policy lives in the orchestrator.

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a single GET failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The server answered with a non-2xx status
    Status(u16),

    /// The request or the body read timed out
    Timeout,

    /// Connection refused, DNS failure, TLS failure, reset
    Connect,

    /// Headers arrived but the body could not be read or decoded
    Body(String),

    /// Any other request failure
    Request(String),
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timeout"),
            Self::Connect => write!(f, "connection failed"),
            Self::Body(msg) => write!(f, "body read failed: {}", msg),
            Self::Request(msg) => write!(f, "{}", msg),
        }
    }
}

/// A failed fetch of `url`
#[derive(Debug, Clone, Error)]
#[error("fetch of {url} failed: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// Returns true if repeating the request could plausibly succeed
    ///
    /// | Condition | Transient |
    /// |-----------|-----------|
    /// | HTTP 5xx | yes |
    /// | HTTP 429 | yes |
    /// | Other HTTP status | no |
    /// | Timeout | yes |
    /// | Connection failure | yes |
    /// | Body read failure | yes |
    /// | Other | no |
    pub fn is_transient(&self) -> bool {
        match &self.kind {
            FetchErrorKind::Status(code) => {
                *code >= 500 || *code == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            FetchErrorKind::Timeout | FetchErrorKind::Connect | FetchErrorKind::Body(_) => true,
            FetchErrorKind::Request(_) => false,
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            FetchErrorKind::Timeout
        } else if error.is_connect() {
            FetchErrorKind::Connect
        } else if let Some(status) = error.status() {
            FetchErrorKind::Status(status.as_u16())
        } else {
            FetchErrorKind::Request(error.to_string())
        };
        Self::new(url, kind)
    }
}

/// Fetches a page and returns its body as text
///
/// Implementations must be safe to call concurrently from many tasks.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP transport configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use tag_harvest::config::HttpConfig;
/// use tag_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header '{}'", name),
        }
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a shared `reqwest::Client`
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(url, FetchErrorKind::Timeout)
            } else {
                FetchError::new(url, FetchErrorKind::Body(e.to_string()))
            }
        })
    }
}
