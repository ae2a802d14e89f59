//! Tone drivers

use crate::config::{BuzzerDriverKind, FeedbackConfig};
use crate::error::BuzzerError;
use std::sync::Arc;
use tracing::debug;

/// Something that can sound a tone until told to stop
pub trait ToneDriver: Send + Sync {
    /// Start a continuous tone
    fn start(&self, frequency_hz: f64) -> Result<(), BuzzerError>;

    /// Silence the output
    fn stop(&self) -> Result<(), BuzzerError>;

    /// Driver name
    fn name(&self) -> &str;
}

/// Logs tones instead of playing them
pub struct LogDriver;

impl ToneDriver for LogDriver {
    fn start(&self, frequency_hz: f64) -> Result<(), BuzzerError> {
        debug!("beep on ({:.0} Hz)", frequency_hz);
        Ok(())
    }

    fn stop(&self) -> Result<(), BuzzerError> {
        debug!("beep off");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

pub struct SilentDriver;

impl ToneDriver for SilentDriver {
    fn start(&self, _frequency_hz: f64) -> Result<(), BuzzerError> {
        Ok(())
    }

    fn stop(&self) -> Result<(), BuzzerError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Build the driver selected in the config.
///
/// Without the `rpi` feature a GPIO request falls back to the log driver.
pub fn driver_from_config(config: &FeedbackConfig) -> Result<Arc<dyn ToneDriver>, BuzzerError> {
    config.validate().map_err(BuzzerError::Config)?;

    match config.driver {
        BuzzerDriverKind::Log => Ok(Arc::new(LogDriver)),
        BuzzerDriverKind::Silent => Ok(Arc::new(SilentDriver)),
        #[cfg(feature = "rpi")]
        BuzzerDriverKind::Gpio => Ok(Arc::new(crate::gpio::GpioBuzzer::new(
            config.pin,
            config.duty_cycle,
        )?)),
        #[cfg(not(feature = "rpi"))]
        BuzzerDriverKind::Gpio => {
            tracing::warn!("GPIO buzzer requested but built without the `rpi` feature, logging tones instead");
            Ok(Arc::new(LogDriver))
        }
    }
}
