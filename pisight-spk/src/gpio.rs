//! Piezo buzzer driven by software PWM on a GPIO pin

use crate::driver::ToneDriver;
use crate::error::BuzzerError;
use parking_lot::Mutex;
use rppal::gpio::{Gpio, OutputPin};
use tracing::info;

pub struct GpioBuzzer {
    pin: Mutex<OutputPin>,
    duty_cycle: f64,
}

impl GpioBuzzer {
    /// Claim `bcm_pin` as a low output. The pin is reset when the buzzer drops.
    pub fn new(bcm_pin: u8, duty_cycle: f64) -> Result<Self, BuzzerError> {
        let gpio = Gpio::new().map_err(|e| BuzzerError::Gpio(format!("Failed to open GPIO: {}", e)))?;
        let pin = gpio
            .get(bcm_pin)
            .map_err(|e| BuzzerError::Gpio(format!("Failed to claim pin {}: {}", bcm_pin, e)))?
            .into_output_low();

        info!("Buzzer on BCM pin {}", bcm_pin);
        Ok(Self {
            pin: Mutex::new(pin),
            duty_cycle,
        })
    }
}

impl ToneDriver for GpioBuzzer {
    fn start(&self, frequency_hz: f64) -> Result<(), BuzzerError> {
        self.pin
            .lock()
            .set_pwm_frequency(frequency_hz, self.duty_cycle)
            .map_err(|e| BuzzerError::Driver(format!("Failed to start PWM: {}", e)))
    }

    fn stop(&self) -> Result<(), BuzzerError> {
        let mut pin = self.pin.lock();
        pin.clear_pwm()
            .map_err(|e| BuzzerError::Driver(format!("Failed to stop PWM: {}", e)))?;
        pin.set_low();
        Ok(())
    }

    fn name(&self) -> &str {
        "gpio"
    }
}
