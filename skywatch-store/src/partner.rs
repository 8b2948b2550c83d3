use std::time::Duration;
use async_trait::async_trait;
use reqwest::Url;
use skywatch_core::{CoreError, CoreResult, InterestCleanup};
use skywatch_shared::models::InterestsDeleted;

/// Cascade client for the collection service's `DELETE /interests/{email}`.
///
/// Every failure (unreachable, timeout, non-2xx, unreadable body) is
/// `PartnerUnavailable`; the deletion coordinator decides to continue.
#[derive(Clone)]
pub struct CollectorClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CollectorClient {
    pub fn new(base_url: &str, timeout: Duration) -> CoreResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            CoreError::ValidationError(format!("Invalid collector URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::ValidationError(format!(
                "Collector URL {} cannot be a base",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::PartnerUnavailable(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    fn interests_url(&self, email: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("interests").push(email);
        }
        url
    }
}

#[async_trait]
impl InterestCleanup for CollectorClient {
    async fn purge_interests(&self, email: &str) -> CoreResult<u64> {
        let unavailable = |e: reqwest::Error| CoreError::PartnerUnavailable(e.to_string());

        let response = self
            .http
            .delete(self.interests_url(email))
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::PartnerUnavailable(format!(
                "collector answered {}",
                status
            )));
        }

        let body: InterestsDeleted = response.json().await.map_err(unavailable)?;
        Ok(body.deleted)
    }
}
