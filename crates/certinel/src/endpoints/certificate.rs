//! Certificate download and revocation

use openssl::x509::X509;
use tracing::{error, info};

use crate::b64;
use crate::client::AcmeClient;
use crate::data::{CertificateBundle, Order};
use crate::error::AcmeError;

/// Certificate operations bound to a client session.
pub struct CertificateEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> CertificateEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// Download the certificate chain for a finalized order.
    ///
    /// POST-as-GET to the order's certificate URL; the PEM stream is split
    /// into leaf / intermediate / fullchain.
    ///
    /// # Errors
    ///
    /// [`AcmeError::Certificate`] when the order has no certificate URL yet
    /// or the download fails.
    pub async fn bundle(&self, order: &Order) -> Result<CertificateBundle, AcmeError> {
        let certificate_url = order
            .certificate_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                AcmeError::Certificate(
                    "order has no certificate URL; finalize it first".to_string(),
                )
            })?;

        let response = self
            .client
            .signed_post_kid(&order.account_url, certificate_url, None)
            .await?;

        if !response.is_success() {
            error!(
                status = response.status,
                order_id = %order.id,
                "Failed to fetch certificate"
            );
            return Err(AcmeError::Certificate(format!(
                "failed to fetch certificate: {}",
                response.problem("failed to fetch certificate")
            )));
        }

        let bundle = CertificateBundle::from_response(&response)?;
        info!(order_id = %order.id, "Certificate bundle downloaded");
        Ok(bundle)
    }

    /// Revoke a certificate.
    ///
    /// The PEM is re-exported as DER through the crypto provider (which
    /// also validates it) and posted with the RFC 5280 `reason` code.
    /// Returns whether the server accepted the revocation; a server-side
    /// refusal is logged, not raised.
    ///
    /// # Errors
    ///
    /// Only parse failures error; see above for server refusals.
    pub async fn revoke(&self, cert_pem: &str, reason: u32) -> Result<bool, AcmeError> {
        let certificate = X509::from_pem(cert_pem.as_bytes())
            .map_err(|e| AcmeError::Certificate(format!("could not parse the certificate: {e}")))?;
        let der = certificate.to_der()?;

        let payload = serde_json::json!({
            "certificate": b64::url_safe_encode(der),
            "reason": reason,
        });

        let revoke_url = self.client.directory().revoke_cert_url().await?;
        let account = self.client.account().get().await?;

        let response = self
            .client
            .signed_post_kid(&account.url, &revoke_url, Some(&payload))
            .await?;

        if response.is_success() {
            info!(reason = reason, "Certificate revoked");
        } else {
            error!(
                status = response.status,
                detail = %response.problem("revocation refused"),
                "Failed to revoke certificate"
            );
        }
        Ok(response.is_success())
    }
}
