use serde::{Deserialize, Serialize};

use crate::GameConfig;

/// Class of an abstract input event. The session decides what it means based
/// on the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Start,
    Swing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    pub time: f64,
}

impl InputEvent {
    pub fn start(time: f64) -> Self {
        Self {
            kind: InputKind::Start,
            time,
        }
    }

    pub fn swing(time: f64) -> Self {
        Self {
            kind: InputKind::Swing,
            time,
        }
    }
}

/// Which physical source the player uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    /// No motion sensor available; taps drive the game.
    #[default]
    Touch,
    /// Device motion drives the game; taps are ignored.
    Motion,
}

impl InputMode {
    /// Verb shown on the idle screen.
    pub fn action_label(self) -> &'static str {
        match self {
            InputMode::Touch => "Touch",
            InputMode::Motion => "Swing",
        }
    }
}

/// Linear acceleration reading from the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub time: f64,
}

/// Turns a continuous acceleration signal into discrete swing events.
#[derive(Debug, Clone)]
pub struct MotionDetector {
    threshold: f64,
    lockout: f64,
    locked_until: Option<f64>,
}

impl MotionDetector {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            threshold: config.acceleration_threshold,
            lockout: config.motion_lockout,
            locked_until: None,
        }
    }

    /// Returns a swing when at least two axes reach the threshold and the
    /// detector is not locked out by a previous swing.
    pub fn classify(&mut self, sample: MotionSample) -> Option<InputEvent> {
        if self.locked_until.is_some_and(|until| sample.time < until) {
            return None;
        }

        let strong_axes = [sample.x, sample.y, sample.z]
            .into_iter()
            .filter(|axis| axis.abs() >= self.threshold)
            .count();
        if strong_axes < 2 {
            return None;
        }

        self.locked_until = Some(sample.time + self.lockout);
        Some(InputEvent::swing(sample.time))
    }

    pub fn is_locked(&self, time: f64) -> bool {
        self.locked_until.is_some_and(|until| time < until)
    }
}

/// Tap source. Taps only count when the game runs in touch mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapInput {
    mode: InputMode,
}

impl TapInput {
    pub fn new(mode: InputMode) -> Self {
        Self { mode }
    }

    pub fn tap(&self, time: f64) -> Option<InputEvent> {
        (self.mode == InputMode::Touch).then(|| InputEvent::swing(time))
    }
}

/// Single pending-swing slot written by the input side and drained by the
/// frame loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwingLatch {
    pending: Option<f64>,
}

impl SwingLatch {
    /// Records a swing; a newer swing replaces an unconsumed older one.
    pub fn record(&mut self, time: f64) {
        self.pending = Some(time);
    }

    pub fn take(&mut self) -> Option<f64> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, z: f64, time: f64) -> MotionSample {
        MotionSample { x, y, z, time }
    }

    #[test]
    fn needs_two_strong_axes() {
        let mut detector = MotionDetector::new(&GameConfig::default());
        assert!(detector.classify(sample(12.0, 3.0, 0.0, 0.0)).is_none());
        assert!(detector.classify(sample(0.0, 0.0, 0.0, 10.0)).is_none());

        let event = detector
            .classify(sample(-11.0, 10.0, 0.0, 20.0))
            .expect("two axes at threshold is a swing");
        assert_eq!(event, InputEvent::swing(20.0));
    }

    #[test]
    fn lockout_suppresses_repeats() {
        let mut detector = MotionDetector::new(&GameConfig::default());
        assert!(detector.classify(sample(15.0, 15.0, 15.0, 100.0)).is_some());
        assert!(detector.is_locked(200.0));
        assert!(detector.classify(sample(15.0, 15.0, 15.0, 250.0)).is_none());
        assert!(detector.classify(sample(15.0, 15.0, 15.0, 399.0)).is_none());
        assert!(detector.classify(sample(15.0, 15.0, 15.0, 400.0)).is_some());
    }

    #[test]
    fn weak_samples_do_not_arm_the_lockout() {
        let mut detector = MotionDetector::new(&GameConfig::default());
        assert!(detector.classify(sample(5.0, 5.0, 5.0, 0.0)).is_none());
        assert!(!detector.is_locked(1.0));
        assert!(detector.classify(sample(10.0, 10.0, 0.0, 1.0)).is_some());
    }

    #[test]
    fn taps_only_count_in_touch_mode() {
        assert_eq!(
            TapInput::new(InputMode::Touch).tap(5.0),
            Some(InputEvent::swing(5.0))
        );
        assert_eq!(TapInput::new(InputMode::Motion).tap(5.0), None);
        assert_eq!(InputMode::Touch.action_label(), "Touch");
        assert_eq!(InputMode::Motion.action_label(), "Swing");
    }

    #[test]
    fn latch_keeps_the_latest_swing() {
        let mut latch = SwingLatch::default();
        latch.record(10.0);
        latch.record(12.0);
        assert!(latch.is_pending());
        assert_eq!(latch.take(), Some(12.0));
        assert_eq!(latch.take(), None);
    }
}
