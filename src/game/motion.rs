//! Motion gesture detection
//!
//! Turns a raw 3-axis accelerometer feed into discrete shake and throw
//! events. The heuristic is deliberately cheap: the L1 norm of the delta
//! between consecutive samples, compared against two thresholds, with
//! hysteresis on shake-stop and a dead window after each throw. No
//! windowed analysis, no magnitude normalization.
//!
//! The detector is phase-agnostic: it reports what the sensor did and
//! nothing else. The turn engine decides whether a given event is acted
//! upon.

use crate::config::MotionConfig;
use serde::{Deserialize, Serialize};

/// One 3-axis accelerometer sample from the host sensor feed. Timestamps
/// are milliseconds in the sensor's own clock domain; arrival rate is
/// uncontrolled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp_ms: u64,
}

/// Discrete gesture events emitted by the detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MotionEvent {
    ShakeStarted,
    ShakeStopped,
    ThrowTriggered,
}

/// Stateful gesture detector; feed it every sample in arrival order.
#[derive(Debug, Clone)]
pub struct MotionDetector {
    config: MotionConfig,
    last_sample: Option<MotionSample>,
    last_sample_ms: u64,
    /// Timestamp of the most recent above-threshold sample; shake-stop
    /// hysteresis is measured from here.
    last_active_ms: u64,
    shaking: bool,
    cooldown_until_ms: Option<u64>,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            last_sample: None,
            last_sample_ms: 0,
            last_active_ms: 0,
            shaking: false,
            cooldown_until_ms: None,
        }
    }

    /// Whether a shake gesture is currently in progress.
    pub fn is_shaking(&self) -> bool {
        self.shaking
    }

    /// Clear all detector state, including the post-throw cooldown. Used
    /// on session reset.
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.last_sample_ms = 0;
        self.last_active_ms = 0;
        self.shaking = false;
        self.cooldown_until_ms = None;
    }

    /// Process one sample and return the events it produced, in order.
    pub fn on_sample(&mut self, sample: MotionSample) -> Vec<MotionEvent> {
        let mut events = Vec::new();

        // Dead window after a throw: the sample is dropped entirely, the
        // stored baseline stays as it was.
        if let Some(until) = self.cooldown_until_ms {
            if sample.timestamp_ms < until {
                return events;
            }
            self.cooldown_until_ms = None;
        }

        // First sample after (re)initialization only establishes the
        // baseline.
        let Some(last) = self.last_sample else {
            self.last_sample = Some(sample);
            self.last_sample_ms = sample.timestamp_ms;
            return events;
        };

        // Throttle: ignore samples arriving faster than the configured
        // interval, without touching the baseline.
        if sample.timestamp_ms.saturating_sub(self.last_sample_ms) < self.config.sample_throttle_ms
        {
            return events;
        }

        let speed =
            (sample.x - last.x).abs() + (sample.y - last.y).abs() + (sample.z - last.z).abs();

        if speed > self.config.shake_threshold {
            self.last_active_ms = sample.timestamp_ms;
            if !self.shaking {
                self.shaking = true;
                events.push(MotionEvent::ShakeStarted);
            }
        } else if self.shaking
            && sample.timestamp_ms.saturating_sub(self.last_active_ms)
                > self.config.shake_hysteresis_ms
        {
            // Sustained stillness, not a momentary dip.
            self.shaking = false;
            events.push(MotionEvent::ShakeStopped);
        }

        if speed > self.config.throw_threshold {
            tracing::debug!(speed, timestamp_ms = sample.timestamp_ms, "throw detected");
            events.push(MotionEvent::ThrowTriggered);
            if self.shaking {
                events.push(MotionEvent::ShakeStopped);
            }
            self.shaking = false;
            self.cooldown_until_ms = Some(sample.timestamp_ms + self.config.throw_cooldown_ms);
        }

        self.last_sample = Some(sample);
        self.last_sample_ms = sample.timestamp_ms;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, timestamp_ms: u64) -> MotionSample {
        MotionSample {
            x,
            y: 0.0,
            z: 0.0,
            timestamp_ms,
        }
    }

    fn detector() -> MotionDetector {
        MotionDetector::new(MotionConfig::default())
    }

    #[test]
    fn constant_stream_emits_nothing() {
        let mut detector = detector();
        for i in 0..50 {
            let events = detector.on_sample(sample(9.81, i * 150));
            assert!(events.is_empty());
        }
        assert!(!detector.is_shaking());
    }

    #[test]
    fn first_sample_only_establishes_baseline() {
        let mut detector = detector();
        // A huge first reading must not fire anything: there is no delta yet.
        assert!(detector.on_sample(sample(100.0, 0)).is_empty());
    }

    #[test]
    fn throttled_samples_are_ignored() {
        let mut detector = detector();
        detector.on_sample(sample(0.0, 0));
        // 50ms after the baseline: dropped even though the delta is large.
        assert!(detector.on_sample(sample(100.0, 50)).is_empty());
        // Next accepted sample still measures against the original baseline.
        let events = detector.on_sample(sample(20.0, 150));
        assert_eq!(events, vec![MotionEvent::ShakeStarted]);
    }

    #[test]
    fn shake_starts_once_and_stops_after_hysteresis() {
        let mut detector = detector();
        detector.on_sample(sample(0.0, 0));
        assert_eq!(
            detector.on_sample(sample(20.0, 150)),
            vec![MotionEvent::ShakeStarted]
        );
        // Still moving: no duplicate ShakeStarted.
        assert!(detector.on_sample(sample(0.0, 300)).is_empty());
        assert!(detector.on_sample(sample(20.0, 450)).is_empty());
        // A short dip below threshold is not a stop yet (within 300ms).
        assert!(detector.on_sample(sample(21.0, 600)).is_empty());
        // Sustained stillness past the hysteresis window stops the shake.
        let events = detector.on_sample(sample(21.0, 1000));
        assert_eq!(events, vec![MotionEvent::ShakeStopped]);
        assert!(!detector.is_shaking());
    }

    #[test]
    fn single_spike_fires_one_throw_and_leaves_no_shake() {
        let mut detector = detector();
        detector.on_sample(sample(0.0, 0));
        let events = detector.on_sample(sample(45.0, 150));
        assert_eq!(
            events,
            vec![
                MotionEvent::ShakeStarted,
                MotionEvent::ThrowTriggered,
                MotionEvent::ShakeStopped,
            ]
        );
        assert!(!detector.is_shaking());
        // Stillness afterwards: nothing lingers.
        assert!(detector.on_sample(sample(45.0, 1300)).is_empty());
    }

    #[test]
    fn second_spike_inside_cooldown_is_swallowed() {
        let mut detector = detector();
        detector.on_sample(sample(0.0, 0));
        let first = detector.on_sample(sample(45.0, 150));
        assert!(first.contains(&MotionEvent::ThrowTriggered));
        // 500ms later, still inside the 1000ms cooldown.
        assert!(detector.on_sample(sample(0.0, 650)).is_empty());
        assert!(detector.on_sample(sample(45.0, 800)).is_empty());
        // Past the cooldown a fresh throw goes through again.
        let later = detector.on_sample(sample(0.0, 1200));
        assert!(later.contains(&MotionEvent::ThrowTriggered));
    }

    #[test]
    fn throw_during_shake_forces_shake_stop() {
        let mut detector = detector();
        detector.on_sample(sample(0.0, 0));
        assert_eq!(
            detector.on_sample(sample(20.0, 150)),
            vec![MotionEvent::ShakeStarted]
        );
        let events = detector.on_sample(sample(70.0, 300));
        assert_eq!(
            events,
            vec![MotionEvent::ThrowTriggered, MotionEvent::ShakeStopped]
        );
        assert!(!detector.is_shaking());
    }

    #[test]
    fn reset_clears_cooldown_and_baseline() {
        let mut detector = detector();
        detector.on_sample(sample(0.0, 0));
        detector.on_sample(sample(45.0, 150));
        detector.reset();
        // Post-reset the first sample is a baseline again, cooldown gone.
        assert!(detector.on_sample(sample(0.0, 200)).is_empty());
        let events = detector.on_sample(sample(45.0, 350));
        assert!(events.contains(&MotionEvent::ThrowTriggered));
    }
}
