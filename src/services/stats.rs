use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{HotelRepository, StoreError};
use crate::models::hotel::LocationStats;

/// Answers how many hotels, and how many phone contacts among them, a
/// location has.
#[async_trait]
pub trait StatsResolver: Send + Sync {
    async fn fetch_stats(&self, location: &str) -> Result<LocationStats, StatsError>;
}

/// Asks the hotel-service over HTTP: `GET {base}/hotels/stats?location=..`.
pub struct HttpStatsResolver {
    http: Client,
    base_url: String,
}

impl HttpStatsResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StatsError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StatsError::Http)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StatsResolver for HttpStatsResolver {
    async fn fetch_stats(&self, location: &str) -> Result<LocationStats, StatsError> {
        let url = format!("{}/hotels/stats", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("location", location)])
            .send()
            .await
            .map_err(StatsError::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(StatsError::Status { status, body });
        }

        response.json().await.map_err(StatsError::Http)
    }
}

/// Aggregates directly against the hotel tables.
pub struct LocalStatsResolver {
    hotels: Arc<dyn HotelRepository>,
}

impl LocalStatsResolver {
    pub fn new(hotels: Arc<dyn HotelRepository>) -> Self {
        Self { hotels }
    }
}

#[async_trait]
impl StatsResolver for LocalStatsResolver {
    async fn fetch_stats(&self, location: &str) -> Result<LocationStats, StatsError> {
        Ok(self.hotels.location_stats(location).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("HTTP request to hotel-service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("hotel-service answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
