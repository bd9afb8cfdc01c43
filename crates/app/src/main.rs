use std::{
    io::BufRead,
    ops::ControlFlow,
    path::{Path, PathBuf},
    sync::mpsc,
};

use clap::{Parser, Subcommand};
use ping_pong_core::{
    AppConfig, BallState, Display, FrameClock, FrameScheduler, GameSession, InputEvent, InputMode,
    JsonFileStore, ManualClock, MemoryScoreStore, MonotonicClock, MotionDetector, MotionSample,
    PingPongError, ScoreStore, Stage, TapInput, TextDisplay, TracingAudioSink,
};
use tracing_subscriber::EnvFilter;

fn main() -> ping_pong_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if cli.debug {
        config.game.debug = true;
    }

    match cli.command {
        Commands::Play { seed, motion } => run_play(&config, seed, motion),
        Commands::Simulate {
            reaction,
            seed,
            max_frames,
        } => run_simulate(&config, reaction, seed, max_frames),
        Commands::MaxScore { reset } => run_max_score(&config.storage.path, reset),
    }
}

/// Messages from the stdin reader to the frame loop.
enum Input {
    Line { text: String, time: f64 },
    Closed,
}

fn run_play(config: &AppConfig, seed: Option<u64>, motion: bool) -> ping_pong_core::Result<()> {
    let mode = if motion {
        InputMode::Motion
    } else {
        InputMode::Touch
    };
    tracing::info!(?seed, ?mode, "starting interactive game");

    let store = JsonFileStore::new(&config.storage.path);
    let mut session = match seed {
        Some(seed) => GameSession::with_seed(config.game.clone(), store, TracingAudioSink, seed),
        None => GameSession::new(config.game.clone(), store, TracingAudioSink),
    }?;
    session.set_input_mode(mode);

    let clock = MonotonicClock::start();
    let scheduler = FrameScheduler::new(config.frame_interval_ms());
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(clock, tx);

    let tap = TapInput::new(mode);
    let mut detector = MotionDetector::new(&config.game);
    let mut display = TextDisplay::new(std::io::stdout());
    let mut failure = None;

    let frames = scheduler.run(&clock, |now| {
        while let Ok(input) = rx.try_recv() {
            match input {
                Input::Line { text, time } => {
                    let event = match mode {
                        InputMode::Touch => tap.tap(time),
                        InputMode::Motion => {
                            parse_motion(&text, time).and_then(|sample| detector.classify(sample))
                        }
                    };
                    if let Some(event) = event {
                        session.handle_input(event);
                    }
                }
                Input::Closed => {
                    scheduler.cancel();
                    return ControlFlow::Break(());
                }
            }
        }

        session.tick(now);
        if let Err(err) = display.present(&session.screen()) {
            failure = Some(err);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });

    tracing::info!(frames, max_score = session.max_score(), "game loop stopped");
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn spawn_stdin_reader(clock: MonotonicClock, tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(text) = line else { break };
            let time = clock.now();
            if tx.send(Input::Line { text, time }).is_err() {
                return;
            }
        }
        let _ = tx.send(Input::Closed);
    });
}

/// Parses `x y z` acceleration readings.
fn parse_motion(text: &str, time: f64) -> Option<MotionSample> {
    let mut axes = text.split_whitespace().map(str::parse::<f64>);
    let (Some(Ok(x)), Some(Ok(y)), Some(Ok(z))) = (axes.next(), axes.next(), axes.next()) else {
        tracing::warn!(text, "expected three acceleration values");
        return None;
    };
    Some(MotionSample { x, y, z, time })
}

fn run_simulate(
    config: &AppConfig,
    reaction: f64,
    seed: u64,
    max_frames: u64,
) -> ping_pong_core::Result<()> {
    tracing::info!(reaction, seed, "simulating bot player");

    let mut session = GameSession::with_seed(
        config.game.clone(),
        MemoryScoreStore::new(),
        TracingAudioSink,
        seed,
    )?;
    let scheduler = FrameScheduler::new(config.frame_interval_ms());
    let mut clock = ManualClock::default();
    let tap = TapInput::new(InputMode::Touch);

    session.handle_input(InputEvent::start(clock.now()));
    let mut planned_swing: Option<f64> = None;
    let mut answered_cue: Option<f64> = None;

    let frames = scheduler.run_simulated(&mut clock, max_frames, |now| {
        if let Some(at) = planned_swing.filter(|at| now >= *at) {
            if let Some(event) = tap.tap(at) {
                session.handle_input(event);
            }
            planned_swing = None;
        }

        let report = session.tick(now);
        if report.stage != Stage::Playing {
            return ControlFlow::Break(());
        }

        if let Some(round) = session.engine().round().active() {
            let fresh_cue = answered_cue != Some(round.cue_fire_time);
            if round.ball == BallState::Incoming && fresh_cue {
                answered_cue = Some(round.cue_fire_time);
                planned_swing = Some(round.cue_fire_time + reaction);
            }
        }
        ControlFlow::Continue(())
    });

    println!(
        "stage: {}, score: {}, frames: {frames}, time: {:.0} ms",
        session.stage(),
        session.score(),
        clock.now()
    );
    Ok(())
}

fn run_max_score(path: &Path, reset: bool) -> ping_pong_core::Result<()> {
    let mut store = JsonFileStore::new(path);
    if reset {
        store.set_max_score(0)?;
        tracing::info!(?path, "max score cleared");
    }
    let score = store.max_score().map_err(|err| {
        PingPongError::msg(format!("could not read {}: {err}", path.display()))
    })?;
    println!("MAX SCORE: {score}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Ping Pong Challenge reflex game", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Show the diagnostic overlay.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play in the terminal. Every line on stdin is a tap; EOF quits.
    Play {
        /// Seed for reproducible rounds.
        #[arg(long)]
        seed: Option<u64>,
        /// Read `x y z` acceleration samples instead of taps.
        #[arg(long)]
        motion: bool,
    },
    /// Let a bot with a fixed reaction time play one game.
    Simulate {
        /// Delay between the incoming cue and the bot's swing, in ms.
        #[arg(short, long, default_value_t = 150.0)]
        reaction: f64,
        /// Seed for the round generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Stop after this many frames even if the game is still running.
        #[arg(long, default_value_t = 1_000_000)]
        max_frames: u64,
    },
    /// Print the persisted max score.
    MaxScore {
        /// Clear it first.
        #[arg(long)]
        reset: bool,
    },
}
