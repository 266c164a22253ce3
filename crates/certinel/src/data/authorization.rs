//! Authorization (domain validation) resource

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::b64;
use crate::data::{extract_id, Identifier};
use crate::error::{AcmeError, Problem};
use crate::transport::HttpResponse;

/// HTTP-01 challenge type name
pub const CHALLENGE_HTTP01: &str = "http-01";
/// DNS-01 challenge type name
pub const CHALLENGE_DNS01: &str = "dns-01";

/// Authorization status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Pending,
    Valid,
    Invalid,
    Deactivated,
    Expired,
    Revoked,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Valid => "valid",
            AuthorizationStatus::Invalid => "invalid",
            AuthorizationStatus::Deactivated => "deactivated",
            AuthorizationStatus::Expired => "expired",
            AuthorizationStatus::Revoked => "revoked",
        };
        write!(f, "{name}")
    }
}

/// A single challenge offered by an authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Problem>,
}

/// One domain authorization; an order carries one per identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub id: String,
    pub url: String,
    pub status: AuthorizationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    pub identifier: Identifier,
    #[serde(default)]
    pub wildcard: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_challenge: Option<Challenge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_challenge: Option<Challenge>,
}

#[derive(Deserialize)]
struct AuthorizationBody {
    status: AuthorizationStatus,
    expires: Option<DateTime<Utc>>,
    identifier: Identifier,
    #[serde(default)]
    wildcard: bool,
    #[serde(default)]
    challenges: Vec<Challenge>,
}

impl Authorization {
    /// Build an authorization from a server response.
    pub fn from_response(response: &HttpResponse, requested_url: &str) -> Result<Self, AcmeError> {
        let body: AuthorizationBody = response.json()?;
        let find = |kind: &str| {
            body.challenges
                .iter()
                .find(|c| c.kind == kind)
                .cloned()
        };

        Ok(Self {
            id: extract_id(requested_url),
            url: requested_url.to_string(),
            status: body.status,
            expires: body.expires,
            identifier: body.identifier,
            wildcard: body.wildcard,
            http_challenge: find(CHALLENGE_HTTP01),
            dns_challenge: find(CHALLENGE_DNS01),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == AuthorizationStatus::Pending
    }

    pub fn is_valid(&self) -> bool {
        self.status == AuthorizationStatus::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.status == AuthorizationStatus::Invalid
    }

    /// True when either challenge carries a server-reported error document.
    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Challenge errors as (challenge type, problem) pairs.
    pub fn errors(&self) -> Vec<(&str, &Problem)> {
        [&self.http_challenge, &self.dns_challenge]
            .into_iter()
            .flatten()
            .filter_map(|c| c.error.as_ref().map(|e| (c.kind.as_str(), e)))
            .collect()
    }

    /// Turn an invalid authorization into a validation error.
    pub fn to_validation_error(&self) -> AcmeError {
        let message = self
            .errors()
            .first()
            .map(|(_, problem)| problem.detail())
            .unwrap_or_else(|| format!("authorization status is {}", self.status));
        AcmeError::Validation {
            domain: self.identifier.value.clone(),
            message,
        }
    }
}

/// Key authorization for a challenge: `token.thumbprint` (RFC 8555 §8.1).
pub fn key_authorization(token: &str, thumbprint: &str) -> String {
    format!("{token}.{thumbprint}")
}

/// DNS-01 TXT record value: base64url(SHA-256(key authorization)).
pub fn dns_digest(token: &str, thumbprint: &str) -> String {
    let digest = Sha256::digest(key_authorization(token, thumbprint).as_bytes());
    b64::url_safe_encode(digest)
}
