//! Authorization and challenge operations

use tracing::{debug, error, info};

use crate::client::AcmeClient;
use crate::data::authorization::{dns_digest, key_authorization};
use crate::data::{Authorization, Challenge, Order};
use crate::error::AcmeError;
use crate::jose::jwk::Jwk;

/// Authorization operations bound to a client session.
pub struct AuthorizationEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> AuthorizationEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// Fetch a single authorization via POST-as-GET.
    pub async fn get(
        &self,
        account_url: &str,
        authorization_url: &str,
    ) -> Result<Authorization, AcmeError> {
        let response = self
            .client
            .signed_post_kid(account_url, authorization_url, None)
            .await?;

        if response.is_success() {
            let authorization = Authorization::from_response(&response, authorization_url)?;
            debug!(
                domain = %authorization.identifier.value,
                status = %authorization.status,
                "Fetched authorization"
            );
            return Ok(authorization);
        }

        error!(
            status = response.status,
            url = %authorization_url,
            "Fetching authorization failed"
        );
        Err(AcmeError::Problem(
            response.problem("fetching authorization failed"),
        ))
    }

    /// Fetch every authorization of an order, in order.
    pub async fn all(&self, order: &Order) -> Result<Vec<Authorization>, AcmeError> {
        let mut authorizations = Vec::with_capacity(order.authorization_urls.len());
        for url in &order.authorization_urls {
            authorizations.push(self.get(&order.account_url, url).await?);
        }
        Ok(authorizations)
    }

    /// Tell the server a challenge's response is in place.
    ///
    /// Posts the empty JSON object to the challenge URL (RFC 8555 §7.5.1);
    /// validation then proceeds server-side and is observed by re-fetching
    /// the authorization.
    pub async fn start_challenge(
        &self,
        account_url: &str,
        challenge: &Challenge,
    ) -> Result<(), AcmeError> {
        info!(
            challenge_type = %challenge.kind,
            url = %challenge.url,
            "Requesting challenge validation"
        );
        let response = self
            .client
            .signed_post_kid(account_url, &challenge.url, Some(&serde_json::json!({})))
            .await?;

        if response.is_success() {
            return Ok(());
        }

        error!(
            status = response.status,
            challenge_type = %challenge.kind,
            "Challenge validation request failed"
        );
        Err(AcmeError::Problem(
            response.problem("challenge validation request failed"),
        ))
    }

    /// Key authorization for a challenge token: `token.thumbprint`.
    ///
    /// This is the body served at `/.well-known/acme-challenge/<token>` for
    /// HTTP-01.
    pub fn key_authorization(&self, token: &str) -> Result<String, AcmeError> {
        let thumbprint = Jwk::from_keys(self.client.account_keys()?)?.thumbprint()?;
        Ok(key_authorization(token, &thumbprint))
    }

    /// DNS-01 TXT record value for a challenge token.
    pub fn dns_digest(&self, token: &str) -> Result<String, AcmeError> {
        let thumbprint = Jwk::from_keys(self.client.account_keys()?)?.thumbprint()?;
        Ok(dns_digest(token, &thumbprint))
    }
}
