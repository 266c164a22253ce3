//! ARI renewal-information lookups

use tracing::{debug, error};

use crate::ari::CertId;
use crate::client::AcmeClient;
use crate::data::RenewalInfo;
use crate::error::AcmeError;

/// Renewal-information operations bound to a client session.
pub struct RenewalInfoEndpoint<'a> {
    client: &'a AcmeClient,
}

impl<'a> RenewalInfoEndpoint<'a> {
    pub(crate) fn new(client: &'a AcmeClient) -> Self {
        Self { client }
    }

    /// Fetch renewal information for a certificate identifier.
    ///
    /// The lookup is an unauthenticated GET of `<renewalInfo>/<certID>`.
    ///
    /// # Errors
    ///
    /// [`AcmeError::RenewalInfoUnsupported`] when the directory does not
    /// advertise ARI; [`AcmeError::Problem`] for server failures (including
    /// 404 when the certificate is unknown).
    pub async fn get(&self, cert_id: &CertId) -> Result<RenewalInfo, AcmeError> {
        let base = self
            .client
            .directory()
            .renewal_info_url()
            .await?
            .filter(|u| !u.is_empty())
            .ok_or(AcmeError::RenewalInfoUnsupported)?;

        let url = format!("{}/{}", base.trim_end_matches('/'), cert_id);
        debug!(url = %url, "Fetching renewal information");

        let response = self.client.transport().get(&url, &[]).await?;
        match response.status {
            200 => {
                let info = RenewalInfo::from_response(&response)?;
                debug!(
                    window_start = %info.suggested_window_start,
                    window_end = %info.suggested_window_end,
                    "Renewal window received"
                );
                Ok(info)
            }
            404 => Err(AcmeError::Problem(response.problem(
                "certificate not found or renewal information not available",
            ))),
            _ => {
                error!(status = response.status, "Failed to get renewal information");
                Err(AcmeError::Problem(
                    response.problem("failed to get renewal information"),
                ))
            }
        }
    }

    /// Fetch renewal information for a leaf certificate PEM.
    pub async fn for_certificate(&self, cert_pem: &str) -> Result<RenewalInfo, AcmeError> {
        let cert_id = CertId::from_pem(cert_pem)?;
        self.get(&cert_id).await
    }

    /// Fetch renewal information for the leaf of a certificate bundle.
    pub async fn for_bundle(&self, bundle: &str) -> Result<RenewalInfo, AcmeError> {
        let cert_id = CertId::from_bundle(bundle)?;
        self.get(&cert_id).await
    }
}
