use std::fmt;
use thiserror::Error;

/// The closed set of runtime faults a trigger can end in.
///
/// Every failed capture or notification maps to exactly one of these, and
/// each has its own feedback pattern on the buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Camera or other local peripheral failed.
    HardwareFault,
    /// Transport error or timeout talking to the backend.
    NetworkFault,
    /// Backend answered with something other than HTTP 200.
    BadResponse,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::HardwareFault => "HARDWARE_FAULT",
            FaultKind::NetworkFault => "NETWORK_FAULT",
            FaultKind::BadResponse => "BAD_RESPONSE",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hardware fault: {0}")]
    Hardware(String),

    #[error("Network fault: {0}")]
    Network(String),

    #[error("Bad response from {endpoint}: HTTP {status}")]
    BadResponse { endpoint: String, status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Fault class used for user feedback. Configuration errors only happen
    /// at startup and have no runtime class.
    pub fn kind(&self) -> Option<FaultKind> {
        match self {
            Error::Io(_) | Error::Hardware(_) => Some(FaultKind::HardwareFault),
            Error::Network(_) => Some(FaultKind::NetworkFault),
            Error::BadResponse { .. } | Error::InvalidResponse(_) => Some(FaultKind::BadResponse),
            Error::Configuration(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
