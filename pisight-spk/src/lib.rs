//! pisight-spk: audible feedback for pisight
//!
//! Provides:
//! - Beep patterns for acknowledgment, each fault kind and low battery
//! - A PWM piezo buzzer on a GPIO pin (`rpi` feature)
//! - Log-only and silent drivers for development machines

pub mod config;
pub mod driver;
pub mod error;
#[cfg(feature = "rpi")]
pub mod gpio;
pub mod pattern;
pub mod player;

pub use config::{BuzzerDriverKind, FeedbackConfig};
pub use driver::{driver_from_config, LogDriver, SilentDriver, ToneDriver};
pub use error::BuzzerError;
pub use pattern::{BeepPattern, Feedback, Tone};
pub use player::FeedbackPlayer;
