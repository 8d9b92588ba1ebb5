//! Configuration management for infill using the prefer crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::ResultDomain;

/// Delay between successful poll cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Initial delay before retrying a failed poll cycle.
pub const DEFAULT_ERROR_RETRY_MS: u64 = 1000;
/// Ceiling for the error-retry backoff.
pub const DEFAULT_MAX_RETRY_MS: u64 = 30_000;
/// How close to document bottom (in px) a scroll must get to trigger a batch.
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 500.0;
/// Placeholder batch size for the general listing.
pub const DEFAULT_GENERAL_BATCH: usize = 10;
/// Placeholder batch size for the image gallery.
pub const DEFAULT_IMAGE_BATCH: usize = 50;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the results endpoint.
    pub endpoint: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay between successful poll cycles in milliseconds.
    pub poll_interval_ms: u64,
    /// Initial retry delay after a failed cycle in milliseconds.
    pub error_retry_ms: u64,
    /// Retry backoff ceiling in milliseconds.
    pub max_retry_ms: u64,
    /// Multiplier applied to the retry delay after each consecutive failure.
    pub retry_backoff_multiplier: f64,
    /// Scroll-trigger distance from document bottom in pixels.
    pub scroll_threshold_px: f64,
    /// Placeholder batch size for general results.
    pub general_batch_size: usize,
    /// Placeholder batch size for image results.
    pub image_batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            user_agent: format!("infill/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: 30,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            error_retry_ms: DEFAULT_ERROR_RETRY_MS,
            max_retry_ms: DEFAULT_MAX_RETRY_MS,
            retry_backoff_multiplier: 2.0,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            general_batch_size: DEFAULT_GENERAL_BATCH,
            image_batch_size: DEFAULT_IMAGE_BATCH,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_retry(&self) -> Duration {
        Duration::from_millis(self.error_retry_ms)
    }

    pub fn max_retry(&self) -> Duration {
        Duration::from_millis(self.max_retry_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Placeholder batch size for a result domain.
    pub fn batch_size(&self, domain: ResultDomain) -> usize {
        match domain {
            ResultDomain::General => self.general_batch_size,
            ResultDomain::Images => self.image_batch_size,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Results endpoint base URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// Delay between successful poll cycles in milliseconds.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    /// Initial retry delay after a failed cycle in milliseconds.
    #[serde(default)]
    pub error_retry_ms: Option<u64>,
    /// Retry backoff ceiling in milliseconds.
    #[serde(default)]
    pub max_retry_ms: Option<u64>,
    /// Placeholder batch size for general results.
    #[serde(default)]
    pub general_batch_size: Option<usize>,
    /// Placeholder batch size for image results.
    #[serde(default)]
    pub image_batch_size: Option<usize>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers infill config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("infill").await {
            Ok(pref_config) => {
                let endpoint: Option<String> = pref_config.get("endpoint").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let poll_interval_ms: Option<u64> = pref_config.get("poll_interval_ms").ok();
                let error_retry_ms: Option<u64> = pref_config.get("error_retry_ms").ok();
                let max_retry_ms: Option<u64> = pref_config.get("max_retry_ms").ok();
                let general_batch_size: Option<usize> =
                    pref_config.get("general_batch_size").ok();
                let image_batch_size: Option<usize> =
                    pref_config.get("image_batch_size").ok();

                Config {
                    endpoint,
                    user_agent,
                    request_timeout,
                    poll_interval_ms,
                    error_retry_ms,
                    max_retry_ms,
                    general_batch_size,
                    image_batch_size,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref endpoint) = self.endpoint {
            settings.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(interval) = self.poll_interval_ms {
            settings.poll_interval_ms = interval;
        }
        if let Some(retry) = self.error_retry_ms {
            settings.error_retry_ms = retry;
        }
        if let Some(max_retry) = self.max_retry_ms {
            settings.max_retry_ms = max_retry;
        }
        if let Some(batch) = self.general_batch_size {
            settings.general_batch_size = batch;
        }
        if let Some(batch) = self.image_batch_size {
            settings.image_batch_size = batch;
        }
    }
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
