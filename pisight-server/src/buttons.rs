//! Push buttons on GPIO, wired pull-down and reported on the falling edge

use crate::config::TriggerConfig;
use crate::triggers::{TriggerEvent, TriggerSender};
use pisight_core::Error;
use rppal::gpio::{Gpio, InputPin, Trigger};
use std::time::Duration;
use tracing::{debug, info};

/// Holds both button pins; interrupts stop and the pins are released on drop
pub struct GpioButtons {
    _capture: InputPin,
    _mode: InputPin,
}

impl GpioButtons {
    pub fn new(config: &TriggerConfig, sender: TriggerSender) -> Result<Self, Error> {
        let gpio = Gpio::new().map_err(|e| Error::Hardware(format!("GPIO unavailable: {}", e)))?;
        let debounce = Some(Duration::from_millis(config.hardware_debounce_ms));

        let capture = watch(&gpio, config.capture_pin, debounce, TriggerEvent::Capture, sender.clone())?;
        let mode = watch(&gpio, config.mode_pin, debounce, TriggerEvent::AdvanceMode, sender)?;

        info!(
            "Buttons armed: capture on BCM {}, mode on BCM {}",
            config.capture_pin, config.mode_pin
        );
        Ok(Self {
            _capture: capture,
            _mode: mode,
        })
    }
}

fn watch(
    gpio: &Gpio,
    pin: u8,
    debounce: Option<Duration>,
    event: TriggerEvent,
    sender: TriggerSender,
) -> Result<InputPin, Error> {
    let mut input = gpio
        .get(pin)
        .map_err(|e| Error::Hardware(format!("GPIO pin {}: {}", pin, e)))?
        .into_input_pulldown();

    input
        .set_async_interrupt(Trigger::FallingEdge, debounce, move |_| {
            debug!("Button on BCM {} released", pin);
            sender.send(event);
        })
        .map_err(|e| Error::Hardware(format!("GPIO interrupt on pin {}: {}", pin, e)))?;

    Ok(input)
}
