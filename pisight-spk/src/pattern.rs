//! Beep patterns

use crate::config::FeedbackConfig;
use pisight_core::FaultKind;
use std::time::Duration;

/// What the user should hear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Single short high pulse
    Ack,
    /// Distinct pattern per fault kind
    Fault(FaultKind),
    /// Four slow low pulses
    LowBattery,
}

/// One tone followed by silence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f64,
    pub duration: Duration,
    pub gap_after: Duration,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeepPattern {
    tones: Vec<Tone>,
}

impl BeepPattern {
    /// `count` identical pulses
    pub fn pulses(count: u8, frequency_hz: f64, pulse: Duration, gap: Duration) -> Self {
        let tones = (0..count)
            .map(|i| Tone {
                frequency_hz,
                duration: pulse,
                // no trailing silence after the last pulse
                gap_after: if i + 1 == count { Duration::ZERO } else { gap },
            })
            .collect();
        Self { tones }
    }

    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.tones.iter().map(|t| t.duration + t.gap_after).sum()
    }
}

impl Feedback {
    pub fn pattern(&self, config: &FeedbackConfig) -> BeepPattern {
        let pulse = Duration::from_millis(config.pulse_ms);
        let gap = Duration::from_millis(config.gap_ms);
        match self {
            Feedback::Ack => BeepPattern::pulses(1, config.high_frequency_hz, pulse, gap),
            Feedback::Fault(FaultKind::NetworkFault) => {
                BeepPattern::pulses(2, config.frequency_hz, pulse, gap)
            }
            Feedback::Fault(FaultKind::BadResponse) => {
                BeepPattern::pulses(3, config.frequency_hz, pulse, gap)
            }
            Feedback::Fault(FaultKind::HardwareFault) => BeepPattern::pulses(
                1,
                config.low_frequency_hz,
                Duration::from_millis(config.long_tone_ms),
                gap,
            ),
            Feedback::LowBattery => {
                BeepPattern::pulses(4, config.low_frequency_hz, pulse, gap * 2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_count() {
        let pattern = BeepPattern::pulses(4, 440.0, Duration::from_millis(100), Duration::from_millis(200));
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.tones()[3].gap_after, Duration::ZERO);
        assert_eq!(pattern.total_duration(), Duration::from_millis(4 * 100 + 3 * 200));
    }

    #[test]
    fn test_zero_pulses() {
        let pattern = BeepPattern::pulses(0, 440.0, Duration::from_millis(100), Duration::from_millis(200));
        assert!(pattern.is_empty());
        assert_eq!(pattern.total_duration(), Duration::ZERO);
    }

    #[test]
    fn test_every_feedback_is_distinct() {
        let config = FeedbackConfig::default();
        let all = [
            Feedback::Ack,
            Feedback::Fault(FaultKind::HardwareFault),
            Feedback::Fault(FaultKind::NetworkFault),
            Feedback::Fault(FaultKind::BadResponse),
            Feedback::LowBattery,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.pattern(&config), b.pattern(&config), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_fault_pulse_counts() {
        let config = FeedbackConfig::default();
        assert_eq!(Feedback::Ack.pattern(&config).len(), 1);
        assert_eq!(Feedback::Fault(FaultKind::NetworkFault).pattern(&config).len(), 2);
        assert_eq!(Feedback::Fault(FaultKind::BadResponse).pattern(&config).len(), 3);
        assert_eq!(Feedback::LowBattery.pattern(&config).len(), 4);

        let hw = Feedback::Fault(FaultKind::HardwareFault).pattern(&config);
        assert_eq!(hw.len(), 1);
        assert_eq!(hw.tones()[0].duration, Duration::from_millis(600));
        assert_eq!(hw.tones()[0].frequency_hz, 220.0);
    }
}
