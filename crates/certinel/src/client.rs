//! ACME client session context
//!
//! [`AcmeClient`] bundles what every operation needs (the directory base
//! URL, the HTTP transport, the account key, and the directory cache) and
//! hands out stateless endpoint values borrowing it. No endpoint holds
//! state of its own; everything flows through this context explicitly.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::directory::{Directory, DirectoryEndpoint};
use crate::endpoints::account::AccountEndpoint;
use crate::endpoints::authorization::AuthorizationEndpoint;
use crate::endpoints::certificate::CertificateEndpoint;
use crate::endpoints::order::OrderEndpoint;
use crate::endpoints::renewal_info::RenewalInfoEndpoint;
use crate::error::AcmeError;
use crate::jose::{self, JwsEnvelope};
use crate::keys::AccountKeys;
use crate::nonce::NonceEndpoint;
use crate::renewal::RenewalManager;
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Let's Encrypt production directory URL
pub const LETSENCRYPT_PRODUCTION: &str = "https://acme-v02.api.letsencrypt.org/directory";
/// Let's Encrypt staging directory URL
pub const LETSENCRYPT_STAGING: &str = "https://acme-staging-v02.api.letsencrypt.org/directory";

/// Default renewal threshold when the CA offers no ARI guidance
const DEFAULT_RENEWAL_DAYS: u32 = 30;

/// A session against one ACME directory with one account key.
pub struct AcmeClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    account_keys: Option<AccountKeys>,
    directory_cache: RwLock<Option<Directory>>,
}

impl AcmeClient {
    /// Start building a client.
    pub fn builder() -> AcmeClientBuilder {
        AcmeClientBuilder::default()
    }

    /// The directory URL this session talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The local account key pair.
    ///
    /// # Errors
    ///
    /// [`AcmeError::NoAccount`] when the client was built without keys.
    pub fn account_keys(&self) -> Result<&AccountKeys, AcmeError> {
        self.account_keys.as_ref().ok_or(AcmeError::NoAccount)
    }

    /// Whether a local account key pair is configured.
    pub fn has_account_keys(&self) -> bool {
        self.account_keys.is_some()
    }

    /// Directory operations (cached document, URL lookups).
    pub fn directory(&self) -> DirectoryEndpoint<'_> {
        DirectoryEndpoint::new(self)
    }

    /// Nonce acquisition.
    pub fn nonce(&self) -> NonceEndpoint<'_> {
        NonceEndpoint::new(self)
    }

    /// Account lifecycle operations.
    pub fn account(&self) -> AccountEndpoint<'_> {
        AccountEndpoint::new(self)
    }

    /// Order lifecycle operations.
    pub fn orders(&self) -> OrderEndpoint<'_> {
        OrderEndpoint::new(self)
    }

    /// Authorization and challenge operations.
    pub fn authorizations(&self) -> AuthorizationEndpoint<'_> {
        AuthorizationEndpoint::new(self)
    }

    /// Certificate download and revocation.
    pub fn certificates(&self) -> CertificateEndpoint<'_> {
        CertificateEndpoint::new(self)
    }

    /// ARI renewal-information lookups.
    pub fn renewal_info(&self) -> RenewalInfoEndpoint<'_> {
        RenewalInfoEndpoint::new(self)
    }

    /// Renewal decisions with the default expiry threshold.
    pub fn renewal_manager(&self) -> RenewalManager<'_> {
        RenewalManager::new(self, DEFAULT_RENEWAL_DAYS)
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    pub(crate) fn directory_cache(&self) -> &RwLock<Option<Directory>> {
        &self.directory_cache
    }

    /// Fetch a nonce, sign with the `kid` header, POST.
    ///
    /// One nonce is consumed per call; callers running concurrent signed
    /// requests under the same account must serialize around this.
    pub(crate) async fn signed_post_kid(
        &self,
        kid: &str,
        url: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, AcmeError> {
        let keys = self.account_keys()?;
        let nonce = self.nonce().get_new().await?;
        let envelope = jose::sign_with_kid(keys, kid, url, &nonce, payload)?;
        self.post_envelope(url, &envelope).await
    }

    /// Fetch a nonce, sign with the `jwk` header, POST.
    pub(crate) async fn signed_post_jwk(
        &self,
        url: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, AcmeError> {
        let keys = self.account_keys()?;
        let nonce = self.nonce().get_new().await?;
        let envelope = jose::sign_with_jwk(keys, url, &nonce, payload)?;
        self.post_envelope(url, &envelope).await
    }

    async fn post_envelope(
        &self,
        url: &str,
        envelope: &JwsEnvelope,
    ) -> Result<HttpResponse, AcmeError> {
        self.transport.post(url, &envelope.to_value(), &[]).await
    }
}

impl std::fmt::Debug for AcmeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcmeClient")
            .field("base_url", &self.base_url)
            .field("has_account_keys", &self.has_account_keys())
            .finish()
    }
}

/// Builder for [`AcmeClient`].
#[derive(Default)]
pub struct AcmeClientBuilder {
    staging: bool,
    base_url: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    account_keys: Option<AccountKeys>,
}

impl AcmeClientBuilder {
    /// Target the Let's Encrypt staging environment.
    ///
    /// Ignored when an explicit base URL is set.
    pub fn staging(mut self, staging: bool) -> Self {
        self.staging = staging;
        self
    }

    /// Target an arbitrary ACME directory URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a custom transport instead of the bundled reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach the local account key pair.
    pub fn account_keys(mut self, keys: AccountKeys) -> Self {
        self.account_keys = Some(keys);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails only when the bundled transport cannot be constructed.
    pub fn build(self) -> Result<AcmeClient, AcmeError> {
        let base_url = self.base_url.unwrap_or_else(|| {
            if self.staging {
                LETSENCRYPT_STAGING.to_string()
            } else {
                LETSENCRYPT_PRODUCTION.to_string()
            }
        });
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        Ok(AcmeClient {
            base_url,
            transport,
            account_keys: self.account_keys,
            directory_cache: RwLock::new(None),
        })
    }
}
