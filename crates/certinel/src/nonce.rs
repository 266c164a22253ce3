//! Anti-replay nonce acquisition
//!
//! Every signed request consumes exactly one nonce. A fresh one is fetched
//! via HEAD immediately before each signed call; nonces are never cached
//! across requests, because the server invalidates them on first use.

use tracing::trace;

use crate::client::AcmeClient;
use crate::error::AcmeError;

/// Nonce operations bound to a client session.
pub struct NonceEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> NonceEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// Fetch a fresh nonce from the `newNonce` resource.
    pub async fn get_new(&self) -> Result<String, AcmeError> {
        let url = self.client.directory().new_nonce_url().await?;
        let response = self.client.transport().head(&url).await?;

        let nonce = response
            .header("replay-nonce")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(AcmeError::MissingNonce)?;
        trace!(nonce = %nonce, "Fetched fresh replay nonce");
        Ok(nonce)
    }
}
