//! Configuration for audible feedback

use serde::{Deserialize, Serialize};

/// Which tone driver to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuzzerDriverKind {
    /// PWM on a GPIO pin (needs the `rpi` feature)
    Gpio,
    /// Log tones through tracing
    Log,
    /// Do nothing
    Silent,
}

/// Feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Play feedback at all
    pub enabled: bool,

    pub driver: BuzzerDriverKind,

    /// BCM pin the buzzer is wired to
    pub pin: u8,

    /// PWM duty cycle (0.0-1.0)
    pub duty_cycle: f64,

    /// Tone for plain pulses (Hz)
    pub frequency_hz: f64,

    /// Tone for the acknowledgment pulse (Hz)
    pub high_frequency_hz: f64,

    /// Tone for hardware faults and low battery (Hz)
    pub low_frequency_hz: f64,

    /// Length of one pulse
    pub pulse_ms: u64,

    /// Silence between pulses
    pub gap_ms: u64,

    /// Length of the hardware-fault tone
    pub long_tone_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            driver: BuzzerDriverKind::Gpio,
            pin: 5,
            duty_cycle: 0.5,
            frequency_hz: 440.0,
            high_frequency_hz: 880.0,
            low_frequency_hz: 220.0,
            pulse_ms: 100,
            gap_ms: 200,
            long_tone_ms: 600,
        }
    }
}

impl FeedbackConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.duty_cycle) {
            return Err("duty_cycle must be between 0.0 and 1.0".to_string());
        }

        for (name, freq) in [
            ("frequency_hz", self.frequency_hz),
            ("high_frequency_hz", self.high_frequency_hz),
            ("low_frequency_hz", self.low_frequency_hz),
        ] {
            if !freq.is_finite() || freq <= 0.0 || freq > 20_000.0 {
                return Err(format!("{} must be between 0 and 20000 Hz", name));
            }
        }

        if self.pulse_ms == 0 || self.pulse_ms > 5_000 {
            return Err("pulse_ms must be between 1 and 5000".to_string());
        }

        if self.gap_ms > 5_000 || self.long_tone_ms > 5_000 {
            return Err("gap_ms and long_tone_ms must not exceed 5000".to_string());
        }

        if self.pin > 27 {
            return Err("Buzzer pin must be a BCM GPIO number (0-27)".to_string());
        }

        Ok(())
    }
}
