use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{Difficulty, GameConfig};

/// Lower bound for the window multiplier. The linear difficulty curve reaches
/// zero at score 100, which would collapse the window when the hard cap is
/// configured above that.
const MIN_WINDOW_MULTIPLIER: f64 = 0.05;

/// Where the ball is within the live round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Cue not fired yet.
    Outgoing,
    /// Cue fired, swing window open.
    Incoming,
}

/// The two critical instants of a round plus the moment it began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveRound {
    pub started_at: f64,
    pub cue_fire_time: f64,
    pub window_close_time: f64,
    pub ball: BallState,
    pub difficulty: Difficulty,
}

impl ActiveRound {
    /// Whether a swing at `time` lands inside the inclusive window.
    pub fn accepts(&self, time: f64) -> bool {
        time >= self.cue_fire_time && time <= self.window_close_time
    }

    /// Length of the swing window.
    pub fn window(&self) -> f64 {
        self.window_close_time - self.cue_fire_time
    }
}

/// The round currently in play, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum RoundSlot {
    #[default]
    NoActiveRound,
    Active(ActiveRound),
}

impl RoundSlot {
    pub fn active(&self) -> Option<&ActiveRound> {
        match self {
            RoundSlot::Active(round) => Some(round),
            RoundSlot::NoActiveRound => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RoundSlot::Active(_))
    }

    pub fn ball(&self) -> BallState {
        self.active()
            .map(|round| round.ball)
            .unwrap_or(BallState::Outgoing)
    }
}

/// Draws randomized cue and window instants for new rounds.
#[derive(Debug, Clone)]
pub struct RoundGenerator {
    return_min: u32,
    return_diff: u32,
    swing_limit: f64,
    rng: StdRng,
}

impl RoundGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates a generator whose rounds are reproducible for a given seed.
    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, rng: StdRng) -> Self {
        Self {
            return_min: config.return_min,
            return_diff: config.return_diff,
            swing_limit: config.swing_limit,
            rng,
        }
    }

    /// Uniform draw in `[return_min, return_min + return_diff]`.
    pub fn draw_base_return(&mut self) -> u32 {
        let max = self.return_min.saturating_add(self.return_diff);
        self.rng.random_range(self.return_min..=max)
    }

    /// Starts a round at `now` using a freshly drawn base return.
    pub fn start_round(&mut self, now: f64, difficulty: Difficulty) -> ActiveRound {
        let base_return = self.draw_base_return();
        self.round_from_base(now, base_return, difficulty)
    }

    /// Builds the round for an already drawn base return.
    pub fn round_from_base(
        &self,
        now: f64,
        base_return: u32,
        difficulty: Difficulty,
    ) -> ActiveRound {
        let multiplier = difficulty.window_multiplier.max(MIN_WINDOW_MULTIPLIER);
        let cue_fire_time = now + f64::from(base_return) * multiplier;
        let window_close_time = cue_fire_time + self.swing_limit * multiplier;

        ActiveRound {
            started_at: now,
            cue_fire_time,
            window_close_time,
            ball: BallState::Outgoing,
            difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generator(seed: u64) -> RoundGenerator {
        RoundGenerator::with_seed(&GameConfig::default(), seed)
    }

    #[test]
    fn builds_round_from_base_return() {
        let round = generator(1).round_from_base(0.0, 700, Difficulty::scale(0));
        assert_eq!(round.cue_fire_time, 700.0);
        assert_eq!(round.window_close_time, 1700.0);
        assert_eq!(round.ball, BallState::Outgoing);
        assert!(round.accepts(700.0));
        assert!(round.accepts(1200.0));
        assert!(round.accepts(1700.0));
        assert!(!round.accepts(699.0));
        assert!(!round.accepts(1800.0));
    }

    #[test]
    fn difficulty_shrinks_delay_and_window() {
        let round = generator(1).round_from_base(1000.0, 800, Difficulty::scale(50));
        assert!((round.cue_fire_time - 1400.0).abs() < 1e-9);
        assert!((round.window() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn window_stays_open_past_the_linear_floor() {
        let round = generator(1).round_from_base(0.0, 600, Difficulty::scale(150));
        assert!(round.cue_fire_time > round.started_at);
        assert!(round.window_close_time > round.cue_fire_time);
    }

    #[test]
    fn same_seed_same_rounds() {
        let mut a = generator(42);
        let mut b = generator(42);
        for step in 0..20 {
            let now = f64::from(step) * 1000.0;
            assert_eq!(
                a.start_round(now, Difficulty::default()),
                b.start_round(now, Difficulty::default())
            );
        }
    }

    #[test]
    fn zero_spread_always_draws_minimum() {
        let config = GameConfig {
            return_min: 700,
            return_diff: 0,
            ..GameConfig::default()
        };
        let mut generator = RoundGenerator::with_seed(&config, 3);
        for _ in 0..10 {
            assert_eq!(generator.draw_base_return(), 700);
        }
    }

    #[test]
    fn slot_defaults_to_no_round() {
        let slot = RoundSlot::default();
        assert!(!slot.is_active());
        assert!(slot.active().is_none());
        assert_eq!(slot.ball(), BallState::Outgoing);
    }

    proptest! {
        #[test]
        fn draws_stay_in_bounds(seed in any::<u64>()) {
            let mut generator = generator(seed);
            let base = generator.draw_base_return();
            prop_assert!((600..=800).contains(&base));
        }

        #[test]
        fn instants_are_ordered(seed in any::<u64>(), now in 0.0f64..1e9, score in 0u32..200) {
            let round = generator(seed).start_round(now, Difficulty::scale(score));
            prop_assert!(round.cue_fire_time > round.started_at);
            prop_assert!(round.window_close_time > round.cue_fire_time);
        }
    }
}
