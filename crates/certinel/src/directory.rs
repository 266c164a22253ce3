//! ACME directory document and cache
//!
//! The directory maps service names to endpoint URLs. It is fetched once on
//! first use and memoized on the client; all endpoint operations resolve
//! URLs through it, never from hardcoded paths.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::AcmeClient;
use crate::error::AcmeError;

/// The directory document (RFC 8555 §7.1.1, plus the ARI extension).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    pub new_nonce: String,
    pub new_account: String,
    pub new_order: String,
    pub revoke_cert: String,
    /// ARI endpoint; present only on CAs implementing RFC 9773
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DirectoryMeta>,
}

/// Optional metadata block of the directory document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caa_identities: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external_account_required: bool,
}

impl Directory {
    /// True when the CA advertises a usable ARI endpoint.
    pub fn supports_ari(&self) -> bool {
        self.renewal_info.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Directory operations bound to a client session.
pub struct DirectoryEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> DirectoryEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// The directory document, fetched lazily and memoized.
    pub async fn all(&self) -> Result<Directory, AcmeError> {
        if let Some(directory) = self.client.directory_cache().read().await.clone() {
            return Ok(directory);
        }

        debug!(url = %self.client.base_url(), "Fetching ACME directory");
        let response = self
            .client
            .transport()
            .get(self.client.base_url(), &[])
            .await?;
        if !response.is_success() {
            return Err(AcmeError::Directory(
                response.problem("cannot get directory"),
            ));
        }

        let directory: Directory = response.json()?;
        *self.client.directory_cache().write().await = Some(directory.clone());
        Ok(directory)
    }

    /// Drop the cached document; the next call re-fetches.
    pub async fn clear_cache(&self) {
        *self.client.directory_cache().write().await = None;
    }

    /// Force a re-fetch and return the fresh document.
    pub async fn refresh(&self) -> Result<Directory, AcmeError> {
        self.clear_cache().await;
        self.all().await
    }

    pub async fn new_nonce_url(&self) -> Result<String, AcmeError> {
        Ok(self.all().await?.new_nonce)
    }

    pub async fn new_account_url(&self) -> Result<String, AcmeError> {
        Ok(self.all().await?.new_account)
    }

    pub async fn new_order_url(&self) -> Result<String, AcmeError> {
        Ok(self.all().await?.new_order)
    }

    pub async fn revoke_cert_url(&self) -> Result<String, AcmeError> {
        Ok(self.all().await?.revoke_cert)
    }

    /// ARI endpoint URL, when the CA advertises one.
    pub async fn renewal_info_url(&self) -> Result<Option<String>, AcmeError> {
        Ok(self.all().await?.renewal_info)
    }

    /// Whether the CA supports ARI.
    pub async fn supports_ari(&self) -> Result<bool, AcmeError> {
        Ok(self.all().await?.supports_ari())
    }

    /// Base URL for order lookups by id, derived from the new-order URL.
    pub async fn order_base_url(&self) -> Result<String, AcmeError> {
        let url = self.all().await?.new_order.replace("new-order", "order");
        Ok(format!("{}/", url.trim_end_matches('/')))
    }
}
