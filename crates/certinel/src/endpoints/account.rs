//! Account lifecycle operations

use tracing::{error, info};

use crate::client::AcmeClient;
use crate::data::AccountData;
use crate::error::AcmeError;
use crate::jose::eab::{self, EabCredentials};
use crate::jose::jwk::Jwk;

/// Account operations bound to a client session.
pub struct AccountEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> AccountEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// Whether a local account key pair is available.
    pub fn exists(&self) -> bool {
        self.client.has_account_keys()
    }

    /// Create (or adopt) the account for the local key pair.
    ///
    /// Terms of service are agreed implicitly; `contacts` entries are URLs
    /// such as `mailto:admin@example.com`. When the CA requires External
    /// Account Binding, pass the credentials it issued out of band.
    ///
    /// # Errors
    ///
    /// [`AcmeError::ExternalAccountBinding`] for bad EAB credentials,
    /// [`AcmeError::Account`] when the server rejects the request.
    pub async fn create(
        &self,
        contacts: &[String],
        eab: Option<&EabCredentials>,
    ) -> Result<AccountData, AcmeError> {
        let new_account_url = self.client.directory().new_account_url().await?;

        let mut payload = serde_json::json!({
            "termsOfServiceAgreed": true,
        });
        if !contacts.is_empty() {
            payload["contact"] = serde_json::json!(contacts);
        }
        if let Some(credentials) = eab {
            let jwk = Jwk::from_keys(self.client.account_keys()?)?;
            let binding = eab::create_binding(credentials, &jwk, &new_account_url)?;
            payload["externalAccountBinding"] = binding.to_value();
            info!(eab_kid = %credentials.kid, "Attaching external account binding");
        }

        info!(contacts = ?contacts, "Creating ACME account");
        let response = self
            .client
            .signed_post_jwk(&new_account_url, Some(&payload))
            .await?;

        if response.is_success() && response.header("location").is_some_and(|l| !l.is_empty()) {
            let account = AccountData::from_response(&response)?;
            info!(account_id = %account.id, status = %account.status, "ACME account ready");
            return Ok(account);
        }

        error!(status = response.status, "Creating account failed");
        Err(AcmeError::Account(
            response.problem("creating account failed"),
        ))
    }

    /// Look up the existing account for the local key pair.
    ///
    /// Posts `{onlyReturnExisting: true}` to the newAccount resource
    /// (RFC 8555 §7.3.1); success is HTTP 200 with a `Location` header
    /// naming the account URL.
    pub async fn get(&self) -> Result<AccountData, AcmeError> {
        if !self.exists() {
            return Err(AcmeError::NoAccount);
        }

        let new_account_url = self.client.directory().new_account_url().await?;
        let payload = serde_json::json!({ "onlyReturnExisting": true });
        let response = self
            .client
            .signed_post_jwk(&new_account_url, Some(&payload))
            .await?;

        if response.status == 200 {
            return AccountData::from_response(&response);
        }

        error!(status = response.status, "Retrieving account failed");
        Err(AcmeError::Account(
            response.problem("retrieving account failed"),
        ))
    }
}
