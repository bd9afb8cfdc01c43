use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{PingPongError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub storage: StorageConfig,
    /// Target display refresh rate driving the frame loop.
    pub frame_rate: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            storage: StorageConfig::default(),
            frame_rate: 60,
        }
    }
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(PingPongError::invalid_config("frame_rate must be positive"));
        }
        self.game.validate()
    }

    /// Duration of a single frame in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.frame_rate.max(1))
    }
}

/// Tunables of the timing game. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Shortest delay between a round starting and the incoming cue.
    pub return_min: u32,
    /// Random spread added on top of `return_min` (inclusive).
    pub return_diff: u32,
    /// Width of the swing window at difficulty zero.
    pub swing_limit: f64,
    /// How long the Game Over / celebration screens stay up.
    pub end_screen_timeout: f64,
    /// Per-axis acceleration a motion sample needs to count as a swing.
    pub acceleration_threshold: f64,
    /// Lockout after an accepted motion swing.
    pub motion_lockout: f64,
    /// Score that ends the session in the celebratory state.
    pub hard_cap_score: u32,
    /// Shows the diagnostic overlay.
    pub debug: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            return_min: 600,
            return_diff: 200,
            swing_limit: 1000.0,
            end_screen_timeout: 3000.0,
            acceleration_threshold: 10.0,
            motion_lockout: 300.0,
            hard_cap_score: 100,
            debug: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.return_min == 0 {
            return Err(PingPongError::invalid_config("return_min must be positive"));
        }
        if !self.swing_limit.is_finite() || self.swing_limit <= 0.0 {
            return Err(PingPongError::invalid_config("swing_limit must be positive"));
        }
        if self.hard_cap_score == 0 {
            return Err(PingPongError::invalid_config(
                "hard_cap_score must be positive",
            ));
        }
        for (name, value) in [
            ("end_screen_timeout", self.end_screen_timeout),
            ("acceleration_threshold", self.acceleration_threshold),
            ("motion_lockout", self.motion_lockout),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(PingPongError::invalid_config(format!(
                    "{name} must not be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Where the persisted max score lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ping-pong-scores.json"),
        }
    }
}
