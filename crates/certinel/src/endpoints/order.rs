//! Order lifecycle operations

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{error, info};

use crate::ari::CertId;
use crate::b64;
use crate::client::AcmeClient;
use crate::data::{AccountData, Identifier, Order};
use crate::error::AcmeError;

const BEGIN_CSR: &str = "-----BEGIN CERTIFICATE REQUEST-----";
const END_CSR: &str = "-----END CERTIFICATE REQUEST-----";

/// Order operations bound to a client session.
pub struct OrderEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> OrderEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// Create a new order for a set of DNS identifiers.
    ///
    /// `replaces` links the order to a prior certificate's ARI CertID; it
    /// is attached only when the directory advertises ARI, and a malformed
    /// CertID is rejected outright. Success is HTTP 201.
    ///
    /// # Errors
    ///
    /// [`AcmeError::MultipleWildcards`] when a domain carries more than one
    /// wildcard label, [`AcmeError::InvalidCertId`] for a bad `replaces`
    /// value, [`AcmeError::Order`] for server rejections.
    pub async fn create(
        &self,
        account: &AccountData,
        domains: &[String],
        replaces: Option<&str>,
    ) -> Result<Order, AcmeError> {
        let mut identifiers = Vec::with_capacity(domains.len());
        for domain in domains {
            if domain.matches("*.").count() > 1 {
                return Err(AcmeError::MultipleWildcards(domain.clone()));
            }
            identifiers.push(Identifier::dns(domain.clone()));
        }

        let mut payload = serde_json::json!({ "identifiers": identifiers });

        let mut attached_replaces = None;
        if let Some(cert_id) = replaces.filter(|c| !c.is_empty()) {
            if self.client.directory().supports_ari().await? {
                if !CertId::is_valid(cert_id) {
                    return Err(AcmeError::InvalidCertId(cert_id.to_string()));
                }
                payload["replaces"] = serde_json::Value::String(cert_id.to_string());
                attached_replaces = Some(cert_id.to_string());
                info!(replaces = %cert_id, "Creating ARI replacement order");
            }
        }

        let new_order_url = self.client.directory().new_order_url().await?;
        info!(domains = ?domains, "Creating certificate order");

        let response = self
            .client
            .signed_post_kid(&account.url, &new_order_url, Some(&payload))
            .await?;

        if response.status == 201 {
            let mut order = Order::from_response(&response, &account.url, &new_order_url)?;
            if order.replaces.is_none() {
                order.replaces = attached_replaces;
            }
            info!(order_id = %order.id, status = %order.status, "Order created");
            return Ok(order);
        }

        error!(
            status = response.status,
            "Creating new order failed; bad response code"
        );
        Err(AcmeError::Order(
            response.problem("creating new order failed"),
        ))
    }

    /// Create an order replacing the given certificate (ARI renewal).
    ///
    /// The `replaces` CertID is derived from the leaf certificate PEM.
    pub async fn create_replacement(
        &self,
        account: &AccountData,
        domains: &[String],
        cert_pem: &str,
    ) -> Result<Order, AcmeError> {
        let cert_id = CertId::from_pem(cert_pem)?;
        self.create(account, domains, Some(&cert_id.to_string()))
            .await
    }

    /// Create a replacement order from a certificate bundle's leaf.
    pub async fn create_replacement_from_bundle(
        &self,
        account: &AccountData,
        domains: &[String],
        bundle: &str,
    ) -> Result<Order, AcmeError> {
        let cert_id = CertId::from_bundle(bundle)?;
        self.create(account, domains, Some(&cert_id.to_string()))
            .await
    }

    /// Fetch an order by id.
    ///
    /// The URL is rebuilt from the directory's order base plus the account
    /// and order ids. Prefer [`OrderEndpoint::get_by_url`] when the order
    /// URL is known; ids are a path convention, not a protocol guarantee.
    pub async fn get(&self, account: &AccountData, id: &str) -> Result<Order, AcmeError> {
        let order_url = format!(
            "{}{}/{}",
            self.client.directory().order_base_url().await?,
            account.id,
            id,
        );
        self.get_by_url(account, &order_url).await
    }

    /// Fetch an order by its URL.
    ///
    /// Any status below 400 is a success; 404 maps to
    /// [`AcmeError::OrderNotFound`], 429 to [`AcmeError::RateLimited`]
    /// (capturing `Retry-After`), anything else to [`AcmeError::Order`].
    pub async fn get_by_url(&self, account: &AccountData, url: &str) -> Result<Order, AcmeError> {
        let response = self.client.transport().get(url, &[]).await?;

        if response.status < 400 {
            return Order::from_response(&response, &account.url, url);
        }

        error!(
            status = response.status,
            url = %url,
            "Getting order failed; bad response code"
        );
        let problem = response.problem("getting order failed");
        match response.status {
            404 => Err(AcmeError::OrderNotFound(problem)),
            429 => Err(AcmeError::RateLimited {
                retry_after: response.retry_after(),
                problem,
            }),
            _ => Err(AcmeError::Order(problem)),
        }
    }

    /// Submit the CSR for a ready order.
    ///
    /// Refuses (returning `Ok(false)`, not an error) unless the order
    /// status is `ready`: "not ready yet" is an expected, pollable state.
    /// On HTTP 200 with a `certificate` field the order's certificate URL
    /// is recorded and the order marked finalized.
    pub async fn finalize(&self, order: &mut Order, csr_pem: &str) -> Result<bool, AcmeError> {
        if !order.is_ready() {
            error!(
                order_id = %order.id,
                status = %order.status,
                "Cannot finalize order that is not ready"
            );
            return Ok(false);
        }

        let csr = normalize_csr(csr_pem)?;
        let payload = serde_json::json!({ "csr": csr });

        let response = self
            .client
            .signed_post_kid(&order.account_url, &order.finalize_url, Some(&payload))
            .await?;

        if response.status == 200 {
            if let Ok(body) = response.json::<serde_json::Value>() {
                if let Some(certificate_url) = body.get("certificate").and_then(|c| c.as_str()) {
                    order.set_certificate_url(certificate_url.to_string());
                }
            }

            if order.is_ari_replacement() {
                info!(
                    order_id = %order.id,
                    replaces = order.replaces.as_deref().unwrap_or_default(),
                    "ARI replacement order finalized"
                );
            } else {
                info!(order_id = %order.id, "Order finalized");
            }
            return Ok(true);
        }

        error!(
            order_id = %order.id,
            status = response.status,
            "Cannot finalize order"
        );
        Ok(false)
    }
}

/// Re-encode a CSR as base64url DER for the finalize payload.
///
/// Accepts PEM-armored or bare-base64 input.
fn normalize_csr(csr: &str) -> Result<String, AcmeError> {
    let body = match (csr.find(BEGIN_CSR), csr.find(END_CSR)) {
        (Some(begin), Some(end)) if begin < end => &csr[begin + BEGIN_CSR.len()..end],
        _ => csr,
    };
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let der = STANDARD
        .decode(&compact)
        .map_err(|e| AcmeError::Encoding(format!("invalid CSR base64: {e}")))?;
    Ok(b64::url_safe_encode(der))
}
