//! Application configuration: one file aggregating every crate's section

use pisight_eye::CameraConfig;
use pisight_rde::RemoteConfig;
use pisight_spk::FeedbackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_BASE_URL: &str = "PISIGHT_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "PISIGHT_LOG_LEVEL";
pub const ENV_SNAPSHOT_DIR: &str = "PISIGHT_SNAPSHOT_DIR";
pub const ENV_VISION_API_KEY: &str = "GOOGLE_VISION_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for pisight_core::Error {
    fn from(err: ConfigError) -> Self {
        pisight_core::Error::Configuration(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub feedback: FeedbackConfig,
    pub remote: RemoteConfig,
    pub triggers: TriggerConfig,
    pub logging: LoggingConfig,
}

/// Button inputs and the trigger queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// BCM pin of the capture button
    pub capture_pin: u8,

    /// BCM pin of the mode button
    pub mode_pin: u8,

    /// Software debounce window per event kind
    pub debounce_ms: u64,

    /// Debounce handed to the GPIO interrupt
    pub hardware_debounce_ms: u64,

    /// Pending events before new ones are dropped
    pub queue_size: usize,

    /// Play the acknowledgment pattern after a successful dispatch
    pub ack_on_success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            capture_pin: 4,
            mode_pin: 27,
            debounce_ms: 500,
            hardware_debounce_ms: 50,
            queue_size: 8,
            ack_on_success: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl TriggerConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, pin) in [("capture_pin", self.capture_pin), ("mode_pin", self.mode_pin)] {
            if pin > 27 {
                return Err(format!("{} must be a BCM pin between 0 and 27", name));
            }
        }
        if self.capture_pin == self.mode_pin {
            return Err("capture_pin and mode_pin must differ".to_string());
        }
        if self.debounce_ms > 10_000 {
            return Err("debounce_ms must not exceed 10000".to_string());
        }
        if self.hardware_debounce_ms > 1_000 {
            return Err("hardware_debounce_ms must not exceed 1000".to_string());
        }
        if self.queue_size == 0 || self.queue_size > 1024 {
            return Err("queue_size must be between 1 and 1024".to_string());
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(format!("Unknown log level: {}", other)),
        }
    }
}

impl AppConfig {
    /// Load from a file (JSON or TOML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Parse configuration text, trying JSON first and then TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let json_err = match serde_json::from_str::<AppConfig>(content) {
            Ok(config) => return Ok(config),
            Err(e) => e,
        };

        match toml::from_str::<AppConfig>(content) {
            Ok(config) => Ok(config),
            Err(toml_err) => Err(ConfigError::Parse(format!(
                "not JSON ({}) or TOML ({})",
                json_err, toml_err
            ))),
        }
    }

    /// Apply `PISIGHT_*` and `GOOGLE_VISION_API_KEY` overrides from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_BASE_URL) {
            self.remote.base_url = url.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_SNAPSHOT_DIR) {
            self.camera.snapshot_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = lookup(ENV_VISION_API_KEY) {
            self.remote.vision_api.api_key = Some(key);
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sections = [
            ("camera", self.camera.validate()),
            ("feedback", self.feedback.validate()),
            ("remote", self.remote.validate()),
            ("triggers", self.triggers.validate()),
            ("logging", self.logging.validate()),
        ];
        for (name, result) in sections {
            result.map_err(|e| ConfigError::Validation(format!("{}: {}", name, e)))?;
        }

        if self.feedback.enabled
            && (self.feedback.pin == self.triggers.capture_pin || self.feedback.pin == self.triggers.mode_pin)
        {
            return Err(ConfigError::Validation(format!(
                "feedback.pin {} is already used by a button",
                self.feedback.pin
            )));
        }

        Ok(())
    }

    /// Pretty TOML rendering, used by `pisight config`
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
