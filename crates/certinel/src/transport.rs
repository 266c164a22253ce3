//! HTTP transport seam
//!
//! The protocol core talks to the ACME server through [`HttpTransport`], a
//! minimal head/get/post capability set. Responses are returned verbatim:
//! status codes and headers untouched, redirects never followed. The core
//! relies on `Location` and `Replay-Nonce` headers and exact status-code
//! buckets.
//!
//! [`ReqwestTransport`] is the bundled implementation. Retry and backoff
//! policy is deliberately NOT implemented here: non-idempotent ACME
//! operations must not be retried blindly, so retries belong to whichever
//! outer layer owns that decision.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{AcmeError, Problem};

/// Default request timeout for the bundled transport
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Media type for signed ACME request bodies
const JOSE_CONTENT_TYPE: &str = "application/jose+json";

/// A verbatim HTTP response: status, headers, body.
///
/// Header names are stored lowercased so lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// True for 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// `Retry-After` header parsed as seconds, when present and numeric.
    pub fn retry_after(&self) -> Option<u64> {
        self.header("retry-after").and_then(|v| v.trim().parse().ok())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AcmeError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Parse the body as an RFC 8555 problem document.
    pub fn problem(&self, fallback: &str) -> Problem {
        Problem::from_response(self, fallback)
    }
}

/// Required capability set of the HTTP collaborator.
///
/// Implementations must not follow redirects and must surface status codes
/// and headers exactly as received.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a HEAD request (used for nonce acquisition).
    async fn head(&self, url: &str) -> Result<HttpResponse, AcmeError>;

    /// Issue a GET request with optional extra headers.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, AcmeError>;

    /// Issue a POST with a JSON body and `application/jose+json` content type.
    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, AcmeError>;
}

/// Bundled transport backed by `reqwest` with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with redirects disabled and a 30s timeout.
    pub fn new() -> Result<Self, AcmeError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("certinel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AcmeError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest::Client`.
    ///
    /// The caller is responsible for having disabled redirect following.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn convert(response: reqwest::Response) -> Result<HttpResponse, AcmeError> {
        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }
        let body = response
            .text()
            .await
            .map_err(|e| AcmeError::Transport(e.to_string()))?;
        trace!(status = status, body_len = body.len(), "HTTP response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn head(&self, url: &str) -> Result<HttpResponse, AcmeError> {
        trace!(url = %url, "HEAD");
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| AcmeError::Transport(e.to_string()))?;
        Self::convert(response).await
    }

    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, AcmeError> {
        trace!(url = %url, "GET");
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AcmeError::Transport(e.to_string()))?;
        Self::convert(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, AcmeError> {
        trace!(url = %url, "POST");
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, JOSE_CONTENT_TYPE)
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AcmeError::Transport(e.to_string()))?;
        Self::convert(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_header(name: &str, value: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert(name.to_string(), value.to_string());
        HttpResponse {
            status: 200,
            headers,
            body: String::new(),
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = response_with_header("replay-nonce", "abc123");
        assert_eq!(resp.header("Replay-Nonce"), Some("abc123"));
        assert_eq!(resp.header("REPLAY-NONCE"), Some("abc123"));
    }

    #[test]
    fn test_retry_after_parses_seconds() {
        let resp = response_with_header("retry-after", "120");
        assert_eq!(resp.retry_after(), Some(120));
    }

    #[test]
    fn test_retry_after_ignores_http_date() {
        let resp = response_with_header("retry-after", "Wed, 21 Oct 2026 07:28:00 GMT");
        assert_eq!(resp.retry_after(), None);
    }

    #[test]
    fn test_is_success_buckets() {
        let mut resp = response_with_header("x", "y");
        resp.status = 201;
        assert!(resp.is_success());
        resp.status = 301;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }
}
