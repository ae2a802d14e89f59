//! Tests for FeedbackPlayer

use parking_lot::Mutex;
use pisight_core::FaultKind;
use pisight_spk::{BuzzerError, Feedback, FeedbackConfig, FeedbackPlayer, ToneDriver};
use std::sync::Arc;

#[derive(Default)]
struct RecordingDriver {
    events: Mutex<Vec<String>>,
    fail_start: bool,
}

impl ToneDriver for RecordingDriver {
    fn start(&self, frequency_hz: f64) -> Result<(), BuzzerError> {
        if self.fail_start {
            return Err(BuzzerError::Driver("pwm unavailable".to_string()));
        }
        self.events.lock().push(format!("on:{}", frequency_hz));
        Ok(())
    }

    fn stop(&self) -> Result<(), BuzzerError> {
        self.events.lock().push("off".to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn fast_config() -> FeedbackConfig {
    FeedbackConfig {
        pulse_ms: 1,
        gap_ms: 1,
        long_tone_ms: 2,
        ..FeedbackConfig::default()
    }
}

fn ons(driver: &RecordingDriver) -> usize {
    driver.events.lock().iter().filter(|e| e.starts_with("on:")).count()
}

#[tokio::test]
async fn test_beep_count() {
    let driver = Arc::new(RecordingDriver::default());
    let player = FeedbackPlayer::new(Arc::new(fast_config()), driver.clone());

    player.beep(4).await;
    assert_eq!(ons(&driver), 4);
    // every start is paired with a stop
    assert_eq!(driver.events.lock().len(), 8);
    assert_eq!(player.patterns_played(), 1);
}

#[tokio::test]
async fn test_fault_patterns() {
    let driver = Arc::new(RecordingDriver::default());
    let player = FeedbackPlayer::new(Arc::new(fast_config()), driver.clone());

    player.play(Feedback::Fault(FaultKind::BadResponse)).await;
    assert_eq!(ons(&driver), 3);

    driver.events.lock().clear();
    player.play(Feedback::Fault(FaultKind::HardwareFault)).await;
    assert_eq!(driver.events.lock().as_slice(), &["on:220".to_string(), "off".to_string()]);
}

#[tokio::test]
async fn test_low_battery_is_four_low_pulses() {
    let driver = Arc::new(RecordingDriver::default());
    let player = FeedbackPlayer::new(Arc::new(fast_config()), driver.clone());

    player.play(Feedback::LowBattery).await;
    let events = driver.events.lock();
    assert_eq!(events.len(), 8);
    assert!(events.iter().step_by(2).all(|e| e == "on:220"));
}

#[tokio::test]
async fn test_ack_uses_high_tone() {
    let driver = Arc::new(RecordingDriver::default());
    let player = FeedbackPlayer::new(Arc::new(fast_config()), driver.clone());
    player.play(Feedback::Ack).await;
    assert_eq!(driver.events.lock()[0], "on:880");
}

#[tokio::test]
async fn test_disabled_feedback_is_silent() {
    let driver = Arc::new(RecordingDriver::default());
    let config = FeedbackConfig { enabled: false, ..fast_config() };
    let player = FeedbackPlayer::new(Arc::new(config), driver.clone());

    player.play(Feedback::LowBattery).await;
    assert!(driver.events.lock().is_empty());
    assert_eq!(player.patterns_played(), 1);
}

#[tokio::test]
async fn test_driver_failure_is_swallowed() {
    let driver = Arc::new(RecordingDriver { fail_start: true, ..Default::default() });
    let player = FeedbackPlayer::new(Arc::new(fast_config()), driver.clone());

    player.play(Feedback::Fault(FaultKind::NetworkFault)).await;
    assert!(driver.events.lock().is_empty());
}

#[tokio::test]
async fn test_concurrent_patterns_do_not_interleave() {
    let driver = Arc::new(RecordingDriver::default());
    let player = Arc::new(FeedbackPlayer::new(Arc::new(fast_config()), driver.clone()));

    let a = {
        let player = player.clone();
        tokio::spawn(async move { player.beep(2).await })
    };
    let b = {
        let player = player.clone();
        tokio::spawn(async move { player.beep(2).await })
    };
    a.await.unwrap();
    b.await.unwrap();

    let events = driver.events.lock().clone();
    assert_eq!(events.len(), 8);
    for pair in events.chunks(2) {
        assert!(pair[0].starts_with("on:"));
        assert_eq!(pair[1], "off");
    }
}
