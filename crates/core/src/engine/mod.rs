use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ActiveRound, BallState, Difficulty, GameConfig, RoundGenerator, RoundSlot};

/// What a single frame evaluation concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Continue,
    /// A swing landed inside the window; the next frame starts a new round.
    RoundWon,
    /// The window closed without a qualifying swing. Terminal.
    SwingTimeout,
    /// The score reached the hard cap. Terminal, celebratory.
    HardCap,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        matches!(self, Outcome::SwingTimeout | Outcome::HardCap)
    }
}

/// Result of [`SwingTimingEngine::tick`], including the side effects the audio
/// coordinator needs to hear about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub score_delta: u32,
    pub outcome: Outcome,
    /// Set when this frame lazily started a round.
    pub round_started: Option<ActiveRound>,
    /// Set on the frame the ball switched to incoming.
    pub cue_fired: bool,
    /// The frame carried a timestamp older than the previous one and was ignored.
    pub skipped: bool,
}

impl TickReport {
    fn new() -> Self {
        Self {
            score_delta: 0,
            outcome: Outcome::Continue,
            round_started: None,
            cue_fired: false,
            skipped: false,
        }
    }

    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::new()
        }
    }
}

/// Per-frame state machine scoring swings against the live round.
#[derive(Debug, Clone)]
pub struct SwingTimingEngine {
    generator: RoundGenerator,
    round: RoundSlot,
    score: u32,
    hard_cap_score: u32,
    last_now: Option<f64>,
}

impl SwingTimingEngine {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_generator(config, RoundGenerator::new(config))
    }

    /// Engine with reproducible rounds.
    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        Self::with_generator(config, RoundGenerator::with_seed(config, seed))
    }

    pub fn with_generator(config: &GameConfig, generator: RoundGenerator) -> Self {
        Self {
            generator,
            round: RoundSlot::NoActiveRound,
            score: 0,
            hard_cap_score: config.hard_cap_score,
            last_now: None,
        }
    }

    /// Clears score and round state for a new session.
    pub fn reset(&mut self) {
        self.round = RoundSlot::NoActiveRound;
        self.score = 0;
        self.last_now = None;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round(&self) -> &RoundSlot {
        &self.round
    }

    pub fn ball(&self) -> BallState {
        self.round.ball()
    }

    /// Evaluates one frame at `now`, with the most recent swing since the
    /// previous frame. The swing is consumed whatever the outcome.
    pub fn tick(&mut self, now: f64, swing: Option<f64>) -> TickReport {
        if now.is_nan() || self.last_now.is_some_and(|last| now < last) {
            debug!(now, last = ?self.last_now, "dropping out-of-order frame");
            return TickReport::skipped();
        }
        self.last_now = Some(now);

        let mut report = TickReport::new();
        let mut round = match self.round {
            RoundSlot::Active(round) => round,
            RoundSlot::NoActiveRound => {
                let difficulty = Difficulty::scale(self.score);
                let round = self.generator.start_round(now, difficulty);
                debug!(
                    score = self.score,
                    cue = round.cue_fire_time,
                    close = round.window_close_time,
                    "round started"
                );
                report.round_started = Some(round);
                round
            }
        };

        if round.ball == BallState::Outgoing && now >= round.cue_fire_time {
            round.ball = BallState::Incoming;
            report.cue_fired = true;
            debug!(now, "cue fired");
        }
        self.round = RoundSlot::Active(round);

        if round.ball == BallState::Incoming {
            if swing.is_some_and(|time| round.accepts(time)) {
                self.score += 1;
                self.round = RoundSlot::NoActiveRound;
                report.score_delta = 1;
                report.outcome = Outcome::RoundWon;
            } else if now >= round.window_close_time {
                report.outcome = Outcome::SwingTimeout;
                return report;
            }
        }

        if self.score >= self.hard_cap_score {
            report.outcome = Outcome::HardCap;
        }

        report
    }
}
