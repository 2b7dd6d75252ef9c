use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Report service bind address (e.g., "0.0.0.0:8082").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Hotel directory service bind address.
    #[serde(default = "default_hotel_bind_addr")]
    pub hotel_bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string for the report queue. Only the report
    /// service needs it; see [`AppConfig::require_redis_url`].
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Name of the report queue
    #[serde(default = "default_report_queue")]
    pub report_queue: String,

    /// Base URL of the hotel-service. When unset, location stats are
    /// aggregated straight from the local hotel tables.
    #[serde(default)]
    pub hotel_service_url: Option<String>,

    /// Timeout for a single stats request to the hotel-service
    #[serde(default = "default_stats_timeout_secs")]
    pub stats_timeout_secs: u64,

    /// How long one blocking receive waits on the queue before polling again
    #[serde(default = "default_queue_poll_timeout_secs")]
    pub queue_poll_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8082".to_string()
}

fn default_hotel_bind_addr() -> String {
    "0.0.0.0:8081".to_string()
}

fn default_report_queue() -> String {
    "reportQueue".to_string()
}

fn default_stats_timeout_secs() -> u64 {
    10
}

fn default_queue_poll_timeout_secs() -> u64 {
    5
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Redis URL of the report queue, which has no usable default.
    pub fn require_redis_url(&self) -> Result<&str, ConfigError> {
        self.redis_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("REDIS_URL"))
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.stats_timeout_secs)
    }

    pub fn queue_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_poll_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}
