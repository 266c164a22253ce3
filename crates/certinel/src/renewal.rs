//! Renewal scheduling
//!
//! Decides *whether* and *when* to renew a certificate. ARI guidance wins
//! when the CA offers it; certificate expiry minus a threshold is the
//! fallback. Renewal instants are drawn uniformly from the suggested
//! window so a fleet of clients does not stampede the CA.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::client::AcmeClient;
use crate::data::RenewalInfo;
use crate::error::AcmeError;

/// Renewal decisions bound to a client session.
pub struct RenewalManager<'a> {
    client: &'a AcmeClient,
    default_renewal_days: u32,
}

impl<'a> RenewalManager<'a> {
    pub(crate) fn new(client: &'a AcmeClient, default_renewal_days: u32) -> Self {
        Self {
            client,
            default_renewal_days,
        }
    }

    /// Override the expiry-fallback threshold.
    pub fn with_default_renewal_days(mut self, days: u32) -> Self {
        self.default_renewal_days = days;
        self
    }

    /// Should this certificate be renewed now?
    ///
    /// ARI first: inside or past the suggested window means renew;
    /// strictly before it means don't, bypassing the expiry fallback. An
    /// ARI fetch failure is recovered locally: logged as a warning and
    /// the decision falls back to `now >= not_after - renewal_days`.
    pub async fn should_renew(
        &self,
        cert_pem: &str,
        renewal_days: Option<u32>,
    ) -> Result<bool, AcmeError> {
        let renewal_days = renewal_days.unwrap_or(self.default_renewal_days);

        if self.client.directory().supports_ari().await? {
            match self.client.renewal_info().for_certificate(cert_pem).await {
                Ok(renewal_info) => {
                    let now = Utc::now();
                    if renewal_info.should_renew_now(now) {
                        info!("ARI suggests renewal should happen now");
                        return Ok(true);
                    }
                    if !renewal_info.is_in_suggested_window(now) {
                        info!("ARI suggests renewal is not yet needed");
                        return Ok(false);
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "Failed to get ARI information, falling back to expiry-based renewal"
                    );
                }
            }
        }

        self.should_renew_by_expiration(cert_pem, renewal_days)
    }

    /// Expiry-based decision: `now >= not_after - renewal_days`.
    pub fn should_renew_by_expiration(
        &self,
        cert_pem: &str,
        renewal_days: u32,
    ) -> Result<bool, AcmeError> {
        let not_after = certificate_not_after(cert_pem)?;
        let threshold = not_after - Duration::days(i64::from(renewal_days));
        let due = Utc::now() >= threshold;
        debug!(
            expires = %not_after,
            threshold = %threshold,
            due = due,
            "Expiry-based renewal check"
        );
        Ok(due)
    }

    /// Pick the instant to renew at, spread across the ARI window.
    ///
    /// `None` means renew immediately when ARI is unsupported or the fetch
    /// failed. It also means defer to the next normal wake cycle, when a
    /// window was obtained but the draw landed more than `max_sleep_hours`
    /// away.
    /// A returned time is never in the past.
    pub async fn select_renewal_time(
        &self,
        cert_pem: &str,
        max_sleep_hours: u32,
    ) -> Result<Option<DateTime<Utc>>, AcmeError> {
        if !self.client.directory().supports_ari().await? {
            return Ok(None);
        }

        match self.client.renewal_info().for_certificate(cert_pem).await {
            Ok(renewal_info) => Ok(select_time_in_window(
                &renewal_info,
                max_sleep_hours,
                Utc::now(),
            )),
            Err(e) => {
                warn!(error = %e, "Failed to get ARI information for time selection");
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for RenewalManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenewalManager")
            .field("default_renewal_days", &self.default_renewal_days)
            .finish()
    }
}

/// Draw a renewal instant from the suggested window.
///
/// Past the window end, renew immediately (`now`). Otherwise draw
/// uniformly; a draw already in the past clamps to `now`. The result is
/// returned only when it falls within `max_sleep_hours` of now.
fn select_time_in_window(
    renewal_info: &RenewalInfo,
    max_sleep_hours: u32,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if now > renewal_info.suggested_window_end {
        return Some(now);
    }

    let picked = renewal_info.random_time_in_window().max(now);

    if picked <= now + Duration::hours(i64::from(max_sleep_hours)) {
        Some(picked)
    } else {
        None
    }
}

/// Expiry timestamp of the first certificate in a PEM stream.
fn certificate_not_after(cert_pem: &str) -> Result<DateTime<Utc>, AcmeError> {
    let (_, pem) = parse_x509_pem(cert_pem.as_bytes())
        .map_err(|e| AcmeError::Certificate(format!("failed to parse PEM: {e}")))?;
    let (_, cert) = X509Certificate::from_der(&pem.contents)
        .map_err(|e| AcmeError::Certificate(format!("failed to parse certificate: {e}")))?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| AcmeError::Certificate("invalid expiry timestamp".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::issue_test_cert;

    fn info(start: &str, end: &str) -> RenewalInfo {
        RenewalInfo {
            suggested_window_start: start.parse().unwrap(),
            suggested_window_end: end.parse().unwrap(),
            explanation_url: None,
            retry_after: Vec::new(),
        }
    }

    fn at(time: &str) -> DateTime<Utc> {
        time.parse().unwrap()
    }

    #[test]
    fn test_select_time_past_window_renews_immediately() {
        let info = info("2026-08-01T00:00:00Z", "2026-08-03T00:00:00Z");
        let now = at("2026-08-05T00:00:00Z");
        assert_eq!(select_time_in_window(&info, 24, now), Some(now));
    }

    #[test]
    fn test_select_time_inside_window_never_in_past() {
        let info = info("2026-08-01T00:00:00Z", "2026-08-03T00:00:00Z");
        let now = at("2026-08-02T00:00:00Z");
        // large budget: a time must come back, within [now, window end]
        for _ in 0..50 {
            let picked = select_time_in_window(&info, 48, now).unwrap();
            assert!(picked >= now);
            assert!(picked <= info.suggested_window_end);
        }
    }

    #[test]
    fn test_select_time_defers_when_draw_exceeds_budget() {
        // Window starts 100 hours out; a 1-hour budget can never hold it
        let info = info("2026-08-10T00:00:00Z", "2026-08-11T00:00:00Z");
        let now = at("2026-08-01T00:00:00Z");
        assert_eq!(select_time_in_window(&info, 1, now), None);
    }

    #[test]
    fn test_select_time_budget_boundary() {
        // Zero-width window exactly max_sleep_hours away is still taken
        let info = info("2026-08-01T10:00:00Z", "2026-08-01T10:00:00Z");
        let now = at("2026-08-01T00:00:00Z");
        assert_eq!(
            select_time_in_window(&info, 10, now),
            Some(at("2026-08-01T10:00:00Z"))
        );
        assert_eq!(select_time_in_window(&info, 9, now), None);
    }

    #[test]
    fn test_certificate_not_after() {
        let cert = issue_test_cert(90);
        let not_after = certificate_not_after(&cert.leaf_pem).unwrap();
        let days_out = (not_after - Utc::now()).num_days();
        assert!((89..=90).contains(&days_out), "expiry {days_out} days out");
    }

    #[test]
    fn test_certificate_not_after_rejects_garbage() {
        assert!(certificate_not_after("not a pem").is_err());
    }

    #[tokio::test]
    async fn test_should_renew_by_expiration_thresholds() {
        let client = crate::AcmeClient::builder().build().unwrap();
        let manager = client.renewal_manager();

        // Expires in 15 days: due under a 30-day threshold, not under 7
        let cert = issue_test_cert(15);
        assert!(manager
            .should_renew_by_expiration(&cert.leaf_pem, 30)
            .unwrap());
        assert!(!manager
            .should_renew_by_expiration(&cert.leaf_pem, 7)
            .unwrap());
    }
}
