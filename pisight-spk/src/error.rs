//! Error types for pisight-spk

use pisight_core::Error as CoreError;
use thiserror::Error;

/// Buzzer errors
#[derive(Error, Debug)]
pub enum BuzzerError {
    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<BuzzerError> for CoreError {
    fn from(err: BuzzerError) -> Self {
        match err {
            BuzzerError::Config(msg) => CoreError::Configuration(msg),
            other => CoreError::Hardware(format!("Buzzer error: {}", other)),
        }
    }
}
