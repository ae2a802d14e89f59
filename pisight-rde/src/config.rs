//! Configuration for remote dispatch

use serde::{Deserialize, Serialize};
use url::Url;

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the analysis backend (one per run)
    pub base_url: String,

    /// Socket path the backend pushes analysis results to
    pub results_path: String,

    /// Socket path for mode changes and fault notices
    pub info_path: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub retry: RetryConfig,

    /// Cluster count for color detection
    pub color_clusters: u32,

    /// Also push fault notices to the companion app
    pub notify_faults: bool,

    pub vision_api: VisionApiConfig,
}

/// Retry policy for analysis requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. Values above 1 are treated as 1.
    pub max_retries: u32,

    /// Delay before the retry in milliseconds
    pub retry_delay_ms: u64,
}

/// Direct Cloud Vision API access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionApiConfig {
    pub endpoint: String,

    /// API key (falls back to GOOGLE_VISION_API_KEY)
    pub api_key: Option<String>,

    pub max_results: u32,

    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            results_path: "iOS_results".to_string(),
            info_path: "iOS_info".to_string(),
            timeout_secs: 10,
            retry: RetryConfig::default(),
            color_clusters: 3,
            notify_faults: true,
            vision_api: VisionApiConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            retry_delay_ms: 500,
        }
    }
}

impl RetryConfig {
    /// Retries actually attempted (0 or 1)
    pub fn bounded_retries(&self) -> u32 {
        self.max_retries.min(1)
    }
}

impl Default for VisionApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: None,
            max_results: 1,
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_http_url(&self.base_url, "base_url")?;

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err("timeout_secs must be between 1 and 300".to_string());
        }

        if self.retry.retry_delay_ms > 10_000 {
            return Err("retry_delay_ms must not exceed 10000".to_string());
        }

        if self.color_clusters == 0 || self.color_clusters > 16 {
            return Err("color_clusters must be between 1 and 16".to_string());
        }

        for (name, path) in [("results_path", &self.results_path), ("info_path", &self.info_path)] {
            if path.is_empty() || path.contains(['?', '&', '#', '/', ' ']) {
                return Err(format!("{} must be a plain socket path name", name));
            }
        }

        Ok(())
    }
}

impl VisionApiConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_http_url(&self.endpoint, "vision_api.endpoint")?;
        if self.max_results == 0 || self.max_results > 50 {
            return Err("vision_api.max_results must be between 1 and 50".to_string());
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err("vision_api.timeout_secs must be between 1 and 300".to_string());
        }
        Ok(())
    }
}

fn validate_http_url(raw: &str, name: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("{} is not a valid URL: {}", name, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{} must use http or https, got {}", name, other)),
    }
}
