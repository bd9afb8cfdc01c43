use serde::{Deserialize, Serialize};

/// Points needed before the difficulty steps up.
const POINTS_PER_STEP: u32 = 10;
/// Steps needed to add a whole unit of difficulty.
const STEPS_PER_UNIT: f64 = 10.0;

/// Multipliers derived from the current score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// `floor(score / 10) / 10`, unbounded.
    pub level: f64,
    /// Scales the cue delay and the swing window. Reaches zero at score 100.
    pub window_multiplier: f64,
    /// Playback rate applied to every clip.
    pub rate_multiplier: f64,
}

impl Difficulty {
    /// Maps a score to its timing and audio multipliers.
    pub fn scale(score: u32) -> Self {
        let level = f64::from(score / POINTS_PER_STEP) / STEPS_PER_UNIT;
        Self {
            level,
            window_multiplier: 1.0 - level,
            rate_multiplier: 1.0 + level,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::scale(0)
    }
}
