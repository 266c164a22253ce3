//! ARI renewal information snapshot

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AcmeError;
use crate::transport::HttpResponse;

/// A renewal-info document fetched from the ARI endpoint (RFC 9773).
///
/// Immutable snapshot per fetch. Window predicates take an explicit `now`
/// so scheduling decisions stay deterministic under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalInfo {
    pub suggested_window_start: DateTime<Utc>,
    pub suggested_window_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retry_after: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalInfoBody {
    suggested_window: SuggestedWindow,
    #[serde(alias = "explanationURL")]
    explanation_url: Option<String>,
    #[serde(default)]
    retry_after: Vec<String>,
}

#[derive(Deserialize)]
struct SuggestedWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl RenewalInfo {
    /// Parse a renewal-info response body.
    pub fn from_response(response: &HttpResponse) -> Result<Self, AcmeError> {
        let body: RenewalInfoBody = response.json()?;
        Ok(Self {
            suggested_window_start: body.suggested_window.start,
            suggested_window_end: body.suggested_window.end,
            explanation_url: body.explanation_url,
            retry_after: body.retry_after,
        })
    }

    /// True when `now` lies within the suggested window (inclusive).
    pub fn is_in_suggested_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.suggested_window_start && now <= self.suggested_window_end
    }

    /// True when renewal should happen immediately: inside the window, or
    /// already past its end.
    pub fn should_renew_now(&self, now: DateTime<Utc>) -> bool {
        self.is_in_suggested_window(now) || now > self.suggested_window_end
    }

    /// Width of the suggested window.
    pub fn window_duration(&self) -> Duration {
        self.suggested_window_end - self.suggested_window_start
    }

    /// Seconds until the window opens; zero once it has.
    pub fn seconds_until_window_start(&self, now: DateTime<Utc>) -> i64 {
        (self.suggested_window_start - now).num_seconds().max(0)
    }

    /// A uniformly random instant within the suggested window.
    ///
    /// Spreading renewals across the window keeps a fleet of clients from
    /// hitting the CA at the same instant.
    pub fn random_time_in_window(&self) -> DateTime<Utc> {
        let span = self.window_duration().num_seconds().max(0);
        let offset = rand::thread_rng().gen_range(0..=span);
        self.suggested_window_start + Duration::seconds(offset)
    }
}
