//! .NET release index client
//!
//! Resolves major-only version expressions (`6`, `6.x`) to the newest channel
//! sharing that major number.

#[cfg(test)]
use mockall::automock;

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{HTTP_MAX_ATTEMPTS, HTTP_RETRY_BACKOFF_MS, RELEASES_INDEX_URL};
use crate::version::error::RegistryError;

/// Source of channel information
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseIndex: Send + Sync {
    /// Returns the newest `channel-version` whose major component equals `major`
    ///
    /// # Returns
    /// * `Ok(String)` - Channel such as `"8.0"`
    /// * `Err(RegistryError::NotFound)` - If no channel has that major component
    async fn latest_channel_for_major(&self, major: u64) -> Result<String, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct ReleasesIndexResponse {
    #[serde(rename = "releases-index")]
    releases: Vec<ReleaseInfo>,
}

#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    #[serde(rename = "channel-version")]
    channel_version: String,
}

/// Release index served by Microsoft's release metadata endpoint
pub struct DotnetReleaseIndex {
    client: reqwest::Client,
    index_url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl DotnetReleaseIndex {
    /// Creates a client for a custom index URL
    pub fn new(index_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("actions/setup-dotnet")
                .build()
                .expect("Failed to create HTTP client"),
            index_url: index_url.to_string(),
            max_attempts: HTTP_MAX_ATTEMPTS,
            backoff: Duration::from_millis(HTTP_RETRY_BACKOFF_MS),
        }
    }

    /// Overrides the retry policy
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    async fn fetch_index(&self) -> Result<ReleasesIndexResponse, RegistryError> {
        let mut attempt = 1;
        loop {
            match self.try_fetch_index().await {
                Ok(index) => return Ok(index),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "Release index request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, self.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch_index(&self) -> Result<ReleasesIndexResponse, RegistryError> {
        let response = self.client.get(&self.index_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Release index returned status {}: {}", status, self.index_url);
            return Err(RegistryError::UnexpectedStatus(status.as_u16()));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse release index response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

impl Default for DotnetReleaseIndex {
    fn default() -> Self {
        Self::new(RELEASES_INDEX_URL)
    }
}

#[async_trait::async_trait]
impl ReleaseIndex for DotnetReleaseIndex {
    async fn latest_channel_for_major(&self, major: u64) -> Result<String, RegistryError> {
        let index = self.fetch_index().await?;
        debug!("Release index lists {} channels", index.releases.len());

        let major_tag = major.to_string();
        index
            .releases
            .into_iter()
            .map(|release| release.channel_version)
            .filter(|channel| channel.split('.').next() == Some(major_tag.as_str()))
            .max_by_key(|channel| minor_component(channel))
            .ok_or_else(|| RegistryError::NotFound {
                major: major.to_string(),
                url: self.index_url.clone(),
            })
    }
}

fn minor_component(channel: &str) -> u64 {
    channel
        .split('.')
        .nth(1)
        .and_then(|minor| minor.parse().ok())
        .unwrap_or(0)
}

/// Connection failures, timeouts, throttling and server errors are worth another attempt
fn is_retryable(error: &RegistryError) -> bool {
    match error {
        RegistryError::Network(e) => e.is_connect() || e.is_timeout() || e.is_request(),
        RegistryError::UnexpectedStatus(status) => *status == 429 || *status >= 500,
        RegistryError::NotFound { .. } | RegistryError::InvalidResponse(_) => false,
    }
}
