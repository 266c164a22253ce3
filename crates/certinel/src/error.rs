//! ACME error types
//!
//! Server-reported failures arrive as RFC 8555 §6.7 problem documents and
//! are parsed once at the response boundary into [`Problem`]; everything
//! else (crypto, encoding, storage) fails fast with a descriptive variant.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Identifier;
use crate::transport::HttpResponse;

/// URN prefix for ACME error types (RFC 8555 §6.7).
pub const URN_ERROR_PREFIX: &str = "urn:ietf:params:acme:error:";

/// An RFC 8555 §6.7 problem document as reported by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Problem {
    /// Error type URN, e.g. `urn:ietf:params:acme:error:badNonce`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    /// Human-readable explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// URL the client should visit for more information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Per-identifier sub-errors for compound failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subproblems: Vec<Subproblem>,
    /// Identifier the error relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    /// HTTP status code of the response that carried this document
    #[serde(skip)]
    pub status: u16,
}

/// A single entry of a problem document's `subproblems` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subproblem {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
}

impl Problem {
    /// Build a problem from a server response.
    ///
    /// Parses the body as a problem document when possible; otherwise the
    /// `fallback` message becomes the detail. The HTTP status is always
    /// captured.
    pub fn from_response(response: &HttpResponse, fallback: &str) -> Self {
        let mut problem = serde_json::from_str::<Problem>(&response.body).unwrap_or_default();
        if problem.detail.is_none() {
            problem.detail = Some(fallback.to_string());
        }
        problem.status = response.status;
        problem
    }

    /// The error type with the `urn:ietf:params:acme:error:` prefix removed.
    pub fn acme_type(&self) -> Option<&str> {
        self.problem_type
            .as_deref()
            .map(|t| t.strip_prefix(URN_ERROR_PREFIX).unwrap_or(t))
    }

    /// Check the error against an unprefixed RFC 8555 type name, e.g. `badNonce`.
    pub fn is_type(&self, name: &str) -> bool {
        self.acme_type() == Some(name)
    }

    /// Server-provided detail, or a generic message derived from the status.
    pub fn detail(&self) -> String {
        self.detail
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail())?;
        if let Some(kind) = self.acme_type() {
            write!(f, " ({kind})")?;
        }
        Ok(())
    }
}

/// Errors that can occur during ACME operations
#[derive(Debug, Error)]
pub enum AcmeError {
    /// No local account key has been configured on the client
    #[error("no local account key configured")]
    NoAccount,

    /// Account creation or retrieval failed
    #[error("account operation failed: {0}")]
    Account(Problem),

    /// Generic order failure reported by the server
    #[error("order operation failed: {0}")]
    Order(Problem),

    /// The requested order does not exist (HTTP 404)
    #[error("order not found: {0}")]
    OrderNotFound(Problem),

    /// The server applied a rate limit (HTTP 429)
    #[error("rate limited (retry after {retry_after:?} seconds): {problem}")]
    RateLimited {
        /// Seconds from the `Retry-After` header, when the server sent one
        retry_after: Option<u64>,
        problem: Problem,
    },

    /// An identifier contained more than one wildcard label
    #[error("cannot create orders with multiple wildcards in one identifier: '{0}'")]
    MultipleWildcards(String),

    /// An ARI certificate identifier did not match `base64url(aki).base64url(serial)`
    #[error("invalid ARI certificate id: {0}")]
    InvalidCertId(String),

    /// A domain authorization challenge failed
    #[error("domain validation failed for '{domain}': {message}")]
    Validation { domain: String, message: String },

    /// Certificate download, parsing, or revocation failed
    #[error("certificate operation failed: {0}")]
    Certificate(String),

    /// The directory document could not be fetched
    #[error("cannot get directory: {0}")]
    Directory(Problem),

    /// ARI was requested but the directory does not advertise a renewalInfo URL
    #[error("ACME server does not support renewal information (ARI)")]
    RenewalInfoUnsupported,

    /// Any other server-reported problem document
    #[error("ACME server problem: {0}")]
    Problem(Problem),

    /// The account key is neither RSA nor a supported ECDSA key
    #[error("unsupported key type for JWS signing")]
    UnsupportedKeyType,

    /// The ECDSA key uses a curve outside P-256/P-384/P-521
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// The signing primitive itself failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// An ECDSA signature was not valid ASN.1 DER
    #[error("malformed ECDSA signature: {0}")]
    MalformedSignature(&'static str),

    /// External Account Binding credentials were missing or invalid
    #[error("invalid external account binding: {0}")]
    ExternalAccountBinding(String),

    /// The server response did not carry a `Replay-Nonce` header
    #[error("no Replay-Nonce header in response")]
    MissingNonce,

    /// Transport-level failure (connection, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body could not be decoded as the expected JSON shape
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 or hex decoding failure
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Failure inside the crypto provider
    #[error("crypto provider error: {0}")]
    Crypto(String),

    /// Account key storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AcmeError {
    /// The problem document attached to this error, if the server sent one.
    pub fn problem(&self) -> Option<&Problem> {
        match self {
            AcmeError::Account(p)
            | AcmeError::Order(p)
            | AcmeError::OrderNotFound(p)
            | AcmeError::Directory(p)
            | AcmeError::Problem(p)
            | AcmeError::RateLimited { problem: p, .. } => Some(p),
            _ => None,
        }
    }
}

impl From<openssl::error::ErrorStack> for AcmeError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        AcmeError::Crypto(e.to_string())
    }
}

/// Errors specific to account key storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Account key files do not exist
    #[error("account key not found: {path}")]
    KeyNotFound { path: String },

    /// A stored key could not be parsed
    #[error("invalid stored key: {0}")]
    InvalidKey(String),
}
