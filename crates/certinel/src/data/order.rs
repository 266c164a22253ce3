//! Order resource and status machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{extract_id, Identifier};
use crate::error::AcmeError;
use crate::transport::HttpResponse;

/// Server-side order status.
///
/// `pending → ready → processing → valid`, with `invalid` reachable from
/// any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Ready,
    Processing,
    Valid,
    Invalid,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Processing => "processing",
            OrderStatus::Valid => "valid",
            OrderStatus::Invalid => "invalid",
        };
        write!(f, "{name}")
    }
}

/// A certificate order.
///
/// Orders are value objects produced per call; `finalize` on the order
/// endpoint is the only operation that mutates one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub url: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    pub identifiers: Vec<Identifier>,
    pub authorization_urls: Vec<String>,
    pub finalize_url: String,
    pub account_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
    pub finalized: bool,
    /// ARI CertID of the certificate this order replaces, when created as a
    /// renewal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
}

#[derive(Deserialize)]
struct OrderBody {
    status: OrderStatus,
    expires: Option<DateTime<Utc>>,
    identifiers: Vec<Identifier>,
    authorizations: Vec<String>,
    finalize: String,
    certificate: Option<String>,
    replaces: Option<String>,
}

impl Order {
    /// Build an order from a server response.
    ///
    /// The order URL comes from the `Location` header when present, falling
    /// back to the URL the request was made to.
    pub fn from_response(
        response: &HttpResponse,
        account_url: &str,
        requested_url: &str,
    ) -> Result<Self, AcmeError> {
        let url = response
            .header("location")
            .filter(|u| !u.is_empty())
            .unwrap_or(requested_url)
            .trim_end_matches('?')
            .trim()
            .to_string();
        let body: OrderBody = response.json()?;

        Ok(Self {
            id: extract_id(&url),
            url,
            status: body.status,
            expires: body.expires,
            identifiers: body.identifiers,
            authorization_urls: body.authorizations,
            finalize_url: body.finalize,
            account_url: account_url.to_string(),
            certificate_url: body.certificate,
            finalized: false,
            replaces: body.replaces,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_ready(&self) -> bool {
        self.status == OrderStatus::Ready
    }

    pub fn is_valid(&self) -> bool {
        self.status == OrderStatus::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.status == OrderStatus::Invalid
    }

    /// True once finalize succeeded, or when the server already reports the
    /// order valid.
    pub fn is_finalized(&self) -> bool {
        self.finalized || self.is_valid()
    }

    /// True when this order was created to replace an existing certificate
    /// via ARI.
    pub fn is_ari_replacement(&self) -> bool {
        self.replaces.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// Record the issued certificate's URL and mark the order finalized.
    pub(crate) fn set_certificate_url(&mut self, url: String) {
        self.certificate_url = Some(url);
        self.finalized = true;
    }
}
