//! Upstream HTTP transport
//!
//! A reqwest client bound to one base URL. Callers build requests with
//! relative paths and get the raw status and body back; interpreting the
//! body is left to the caller.

use bytes::Bytes;
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Transport-level failure: no HTTP response was obtained
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Invalid upstream base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Response as received from upstream
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP client for the upstream API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client for `base_url`.
    ///
    /// `timeout` of `None` keeps reqwest's default (no overall timeout).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, UpstreamError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(UpstreamError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a relative path and optional raw query string
    pub fn url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}/{}?{}", self.base_url, path, q),
            None => format!("{}/{}", self.base_url, path),
        }
    }

    /// Start a request against `path`
    pub fn request(&self, method: Method, path: &str, query: Option<&str>) -> reqwest::RequestBuilder {
        self.http.request(method, self.url(path, query))
    }

    /// Send a prepared request and buffer the response body
    pub async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if status >= 500 {
            tracing::error!(status, "Upstream server error");
        } else if status >= 400 {
            tracing::debug!(status, "Upstream client error");
        }

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}
