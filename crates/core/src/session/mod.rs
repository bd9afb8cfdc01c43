use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    AudioCoordinator, AudioSink, DebugOverlay, FrameStats, GameConfig, InputEvent, InputKind,
    InputMode, Outcome, PingPongError, Result, Screen, ScoreStore, SwingLatch, SwingTimingEngine,
    View,
};

/// Top-level stage of a play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    Playing,
    Ended,
    Celebrating,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Ended | Stage::Celebrating)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Playing => "playing",
            Stage::Ended => "ended",
            Stage::Celebrating => "celebrating",
        };
        f.write_str(name)
    }
}

/// Snapshot returned by [`GameSession::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub stage: Stage,
    pub score: u32,
    /// Engine verdict when the frame was evaluated by the timing engine.
    pub outcome: Option<Outcome>,
}

/// The single mutable aggregate for the game. Inputs only latch a pending
/// swing; every state change happens inside [`GameSession::tick`] or
/// [`GameSession::handle_input`] on the loop that owns the session.
#[derive(Debug)]
pub struct GameSession<S: ScoreStore, A: AudioSink> {
    config: GameConfig,
    seed: Option<u64>,
    stage: Stage,
    engine: SwingTimingEngine,
    swing: SwingLatch,
    max_score: u32,
    store: S,
    audio: AudioCoordinator<A>,
    input_mode: InputMode,
    display_deadline: Option<f64>,
    stats: FrameStats,
}

impl<S: ScoreStore, A: AudioSink> GameSession<S, A> {
    pub fn new(config: GameConfig, store: S, sink: A) -> Result<Self> {
        config.validate()?;
        let engine = SwingTimingEngine::new(&config);
        Ok(Self::build(config, None, store, sink, engine))
    }

    /// Session whose rounds are reproducible for a given seed.
    pub fn with_seed(config: GameConfig, store: S, sink: A, seed: u64) -> Result<Self> {
        config.validate()?;
        let engine = SwingTimingEngine::with_seed(&config, seed);
        Ok(Self::build(config, Some(seed), store, sink, engine))
    }

    fn build(
        config: GameConfig,
        seed: Option<u64>,
        store: S,
        sink: A,
        engine: SwingTimingEngine,
    ) -> Self {
        let max_score = match store.max_score() {
            Ok(score) => score,
            Err(err) => {
                warn!(%err, "max score unavailable, keeping it in memory");
                0
            }
        };

        Self {
            config,
            seed,
            stage: Stage::Idle,
            engine,
            swing: SwingLatch::default(),
            max_score,
            store,
            audio: AudioCoordinator::new(sink),
            input_mode: InputMode::default(),
            display_deadline: None,
            stats: FrameStats::default(),
        }
    }

    /// Replaces the tunables. Only allowed from Idle, so a running game and
    /// the score on an end screen stay untouched.
    pub fn apply_config(&mut self, config: GameConfig) -> Result<()> {
        if self.stage != Stage::Idle {
            return Err(PingPongError::msg(format!(
                "configuration can only change while idle, not while {}",
                self.stage
            )));
        }
        config.validate()?;

        self.engine = match self.seed {
            Some(seed) => SwingTimingEngine::with_seed(&config, seed),
            None => SwingTimingEngine::new(&config),
        };
        self.config = config;
        Ok(())
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    /// Interprets an input according to the current stage. Starts a game
    /// from Idle, latches a swing while Playing, ignored otherwise.
    pub fn handle_input(&mut self, event: InputEvent) {
        match (self.stage, event.kind) {
            (Stage::Idle, _) => self.start_game(),
            (Stage::Playing, InputKind::Swing) => self.swing.record(event.time),
            _ => {}
        }
    }

    /// Advances the session by one frame.
    pub fn tick(&mut self, now: f64) -> FrameReport {
        self.stats.record(now);
        let mut outcome = None;

        match self.stage {
            Stage::Playing => {
                let swing = self.swing.take();
                let report = self.engine.tick(now, swing);
                self.audio.on_tick(&report);

                match report.outcome {
                    Outcome::SwingTimeout => self.end_game(now),
                    Outcome::HardCap => self.celebrate(now),
                    Outcome::Continue | Outcome::RoundWon => {}
                }
                if !report.skipped {
                    outcome = Some(report.outcome);
                }
            }
            Stage::Ended | Stage::Celebrating => {
                if self.display_deadline.is_some_and(|deadline| now >= deadline) {
                    self.finish_display();
                }
            }
            Stage::Idle => {}
        }

        FrameReport {
            stage: self.stage,
            score: self.score(),
            outcome,
        }
    }

    /// Leaves the Game Over or celebration screen. Returns whether a
    /// transition happened; repeated calls are no-ops.
    pub fn finish_display(&mut self) -> bool {
        if !self.stage.is_terminal() {
            return false;
        }
        self.stage = Stage::Idle;
        self.display_deadline = None;
        info!("back to idle");
        true
    }

    fn start_game(&mut self) {
        self.engine.reset();
        self.swing.clear();
        self.audio.session_started();
        self.display_deadline = None;
        self.stage = Stage::Playing;
        info!("game started");
    }

    fn end_game(&mut self, now: f64) {
        let score = self.score();
        if score >= self.max_score {
            self.max_score = score;
            if let Err(err) = self.store.set_max_score(score) {
                warn!(%err, score, "could not persist max score");
            }
        }
        self.stage = Stage::Ended;
        self.display_deadline = Some(now + self.config.end_screen_timeout);
        info!(score, max_score = self.max_score, "game over");
    }

    fn celebrate(&mut self, now: f64) {
        self.stage = Stage::Celebrating;
        self.display_deadline = Some(now + self.config.end_screen_timeout);
        info!(score = self.score(), "hard cap reached");
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn engine(&self) -> &SwingTimingEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audio_sink(&self) -> &A {
        self.audio.sink()
    }

    /// What the display collaborator should show this frame.
    pub fn screen(&self) -> Screen {
        let score = self.score();
        let view = match self.stage {
            Stage::Idle => View::Idle {
                max_score: (self.max_score >= 1).then_some(self.max_score),
                input: self.input_mode,
            },
            Stage::Playing => View::Playing { score },
            Stage::Ended => View::Ended { score },
            Stage::Celebrating => View::Celebrating,
        };
        let overlay = self.config.debug.then(|| DebugOverlay {
            fps: self.fps(),
            stage: self.stage,
            score,
        });

        Screen { view, overlay }
    }
}
