//! pisight-eye: still image acquisition for pisight
//!
//! Grabs one frame per capture trigger from the Pi camera module (through the
//! libcamera still tool) or from a fixed file, scales it so its longer side
//! matches a target, encodes it as JPEG and optionally keeps a copy on disk
//! for debugging.

pub mod camera;
pub mod config;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod processing;
pub mod snapshot;

pub use camera::{CameraBackend, CameraManager, RpicamStill, StillImageFile};
pub use config::{CameraConfig, CameraSource, SnapshotNaming};
pub use encoding::encode_jpeg;
pub use error::VisionError;
pub use frame::CapturedImage;
pub use processing::{resize_to_max_dimension, scaled_dimensions};
pub use snapshot::SnapshotWriter;
