//! Error types for pisight-rde

use pisight_core::{Error as CoreError, FaultKind};
use pisight_eye::VisionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("Bad response from {endpoint}: HTTP {status}")]
    BadResponse { endpoint: String, status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Image error: {0}")]
    Image(#[from] VisionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DispatchError {
    pub fn kind(&self) -> Option<FaultKind> {
        match self {
            DispatchError::Network { .. } => Some(FaultKind::NetworkFault),
            DispatchError::BadResponse { .. } | DispatchError::InvalidResponse(_) => {
                Some(FaultKind::BadResponse)
            }
            DispatchError::Image(_) => Some(FaultKind::HardwareFault),
            DispatchError::Config(_) => None,
        }
    }

    /// Transport faults and server-side errors may succeed on a second try.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Network { .. } => true,
            DispatchError::BadResponse { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<DispatchError> for CoreError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Network { endpoint, message } => {
                CoreError::Network(format!("{}: {}", endpoint, message))
            }
            DispatchError::BadResponse { endpoint, status } => CoreError::BadResponse { endpoint, status },
            DispatchError::InvalidResponse(msg) => CoreError::InvalidResponse(msg),
            DispatchError::Image(e) => e.into(),
            DispatchError::Config(msg) => CoreError::Configuration(msg),
        }
    }
}
