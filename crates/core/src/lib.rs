//! Core library for the Ping Pong Challenge reflex game.
//!
//! The player has to swing inside a randomized window after an audio cue.
//! Each module owns one piece of that loop: the difficulty curve, the round
//! generator, the per-frame timing engine, the session state machine, and the
//! collaborators it talks to (input, audio, score storage, display, clock).

pub mod audio;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod input;
pub mod render;
pub mod round;
pub mod session;
pub mod store;
pub mod timeline;

pub use audio::{
    AudioCommand, AudioCoordinator, AudioSink, Clip, RecordingAudioSink, TracingAudioSink,
};
pub use config::{AppConfig, GameConfig, StorageConfig};
pub use difficulty::Difficulty;
pub use engine::{Outcome, SwingTimingEngine, TickReport};
pub use error::{PingPongError, Result};
pub use input::{
    InputEvent, InputKind, InputMode, MotionDetector, MotionSample, SwingLatch, TapInput,
};
pub use render::{DebugOverlay, Display, Screen, TextDisplay, View};
pub use round::{ActiveRound, BallState, RoundGenerator, RoundSlot};
pub use session::{FrameReport, GameSession, Stage};
pub use store::{JsonFileStore, MemoryScoreStore, ScoreStore, MAX_SCORE_KEY};
pub use timeline::{
    CancellationToken, FrameClock, FrameScheduler, FrameStats, ManualClock, MonotonicClock,
};
