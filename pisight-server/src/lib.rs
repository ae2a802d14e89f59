//! pisight-server: the capture-and-dispatch loop
//!
//! Button presses (or keyboard commands) become [`TriggerEvent`]s on a
//! bounded, debounced queue. A single [`CaptureWorker`] drains it: a mode
//! press advances the mode and tells the companion app, a capture press takes
//! one frame and sends it to the analysis operation for the current mode.
//! Failures are reported on the buzzer and never stop the loop.

#[cfg(feature = "rpi")]
pub mod buttons;
pub mod config;
pub mod startup;
pub mod triggers;
pub mod worker;

pub use config::{AppConfig, ConfigError, LoggingConfig, TriggerConfig};
pub use startup::{run, Services};
pub use triggers::{
    parse_command, spawn_keyboard_source, trigger_channel, Debouncer, KeyboardCommand, TriggerEvent,
    TriggerSender,
};
pub use worker::{CaptureWorker, EventOutcome, WorkerStats};
