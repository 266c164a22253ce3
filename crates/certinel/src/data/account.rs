//! Server-side account resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::extract_id;
use crate::error::AcmeError;
use crate::transport::HttpResponse;

/// An ACME account as reported by the server.
///
/// The account URL from the `Location` header is the protocol-significant
/// handle; `id` is its last path segment kept for convenience.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub id: String,
    pub url: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_agreed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountBody {
    status: String,
    contact: Option<Vec<String>>,
    orders: Option<String>,
    terms_of_service_agreed: Option<bool>,
    created_at: Option<DateTime<Utc>>,
}

impl AccountData {
    /// Build account data from a server response.
    ///
    /// The caller has already verified the response is a success carrying a
    /// `Location` header.
    pub fn from_response(response: &HttpResponse) -> Result<Self, AcmeError> {
        let url = response.header("location").unwrap_or_default().trim().to_string();
        let body: AccountBody = response.json()?;
        Ok(Self {
            id: extract_id(&url),
            url,
            status: body.status,
            contact: body.contact,
            orders: body.orders,
            terms_of_service_agreed: body.terms_of_service_agreed,
            created_at: body.created_at,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.status == "valid"
    }
}
