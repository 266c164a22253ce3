//! Wire data entities
//!
//! Each ACME resource gets its own struct with explicit serde encode/decode
//! and a `from_response` constructor; field mapping is spelled out per
//! entity, never derived generically at runtime.

pub mod account;
pub mod authorization;
pub mod bundle;
pub mod order;
pub mod renewal;

pub use account::AccountData;
pub use authorization::{Authorization, AuthorizationStatus, Challenge};
pub use bundle::CertificateBundle;
pub use order::{Order, OrderStatus};
pub use renewal::RenewalInfo;

use serde::{Deserialize, Serialize};

/// An identifier an order or authorization refers to, typed `dns` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Identifier {
    /// A DNS identifier for the given domain.
    pub fn dns(value: impl Into<String>) -> Self {
        Self {
            kind: "dns".to_string(),
            value: value.into(),
        }
    }
}

/// Last path segment of a resource URL.
///
/// ACME identifiers are opaque; the URL is the primary handle and this is a
/// convenience only; see the order endpoint for the caveats.
pub(crate) fn extract_id(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}
