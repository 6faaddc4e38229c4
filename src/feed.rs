use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{errors::FeedError, fuel_station::FeedSnapshot};

pub const BASE_URL: &str = "https://fuelbol-production.up.railway.app";
pub const FUEL_LEVELS_PATH: &str = "/fuel-levels/geo/3/0";

/// Anything that can produce a fresh snapshot of the fuel level feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot, FeedError>;
}

/// HTTP client for the hosted fuel level backend.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
}

impl FeedClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        FeedClient {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn fuel_levels_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FUEL_LEVELS_PATH)
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot, FeedError> {
        let url = self.fuel_levels_url();
        debug!(event = "feed.fetch_started", url = %url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FeedError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status { url, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FeedError::Request {
                url: url.clone(),
                source,
            })?;

        let snapshot = FeedSnapshot::from_json(&body).map_err(|source| FeedError::Decode { source })?;

        info!(
            event = "feed.fetch_completed",
            url = %url,
            features = snapshot.features.len()
        );

        Ok(snapshot)
    }
}
