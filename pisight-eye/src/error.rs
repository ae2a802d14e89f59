//! Error types for pisight-eye

use pisight_core::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<VisionError> for CoreError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Config(msg) => CoreError::Configuration(msg),
            other => CoreError::Hardware(format!("Vision error: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pisight_core::FaultKind;

    #[test]
    fn test_vision_error_display() {
        let err = VisionError::Camera("Test error".to_string());
        assert!(err.to_string().contains("Camera error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_vision_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let vision_err: VisionError = io_err.into();
        assert!(matches!(vision_err, VisionError::Io(_)));
    }

    #[test]
    fn test_vision_error_is_hardware_fault() {
        let core_err: CoreError = VisionError::Camera("rpicam-still exited".to_string()).into();
        assert_eq!(core_err.kind(), Some(FaultKind::HardwareFault));
        assert!(core_err.to_string().contains("rpicam-still exited"));
    }

    #[test]
    fn test_config_error_has_no_fault_kind() {
        let core_err: CoreError = VisionError::Config("bad resolution".to_string()).into();
        assert!(matches!(core_err, CoreError::Configuration(_)));
        assert_eq!(core_err.kind(), None);
    }
}
