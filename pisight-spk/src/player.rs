//! Fire-and-forget feedback playback

use crate::config::FeedbackConfig;
use crate::driver::ToneDriver;
use crate::pattern::{BeepPattern, Feedback};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Plays beep patterns on a tone driver.
///
/// Patterns never overlap; a second call waits for the first to finish.
/// Driver errors are logged and swallowed.
pub struct FeedbackPlayer {
    config: Arc<FeedbackConfig>,
    driver: Arc<dyn ToneDriver>,
    playing: Mutex<()>,
    played: AtomicU64,
}

impl FeedbackPlayer {
    pub fn new(config: Arc<FeedbackConfig>, driver: Arc<dyn ToneDriver>) -> Self {
        Self {
            config,
            driver,
            playing: Mutex::new(()),
            played: AtomicU64::new(0),
        }
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Play the pattern for `feedback`
    pub async fn play(&self, feedback: Feedback) {
        debug!("Feedback: {:?}", feedback);
        let pattern = feedback.pattern(&self.config);
        self.play_pattern(&pattern).await;
    }

    /// Play `count` plain pulses
    pub async fn beep(&self, count: u8) {
        let pattern = BeepPattern::pulses(
            count,
            self.config.frequency_hz,
            Duration::from_millis(self.config.pulse_ms),
            Duration::from_millis(self.config.gap_ms),
        );
        self.play_pattern(&pattern).await;
    }

    /// Number of patterns played (or skipped because feedback is disabled)
    pub fn patterns_played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }

    async fn play_pattern(&self, pattern: &BeepPattern) {
        self.played.fetch_add(1, Ordering::Relaxed);
        if !self.config.enabled || pattern.is_empty() {
            return;
        }

        let _guard = self.playing.lock().await;
        for tone in pattern.tones() {
            if let Err(e) = self.driver.start(tone.frequency_hz) {
                warn!("Buzzer {} failed to start: {}", self.driver.name(), e);
                break;
            }
            tokio::time::sleep(tone.duration).await;
            if let Err(e) = self.driver.stop() {
                warn!("Buzzer {} failed to stop: {}", self.driver.name(), e);
                break;
            }
            if !tone.gap_after.is_zero() {
                tokio::time::sleep(tone.gap_after).await;
            }
        }
    }
}
