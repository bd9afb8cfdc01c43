use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Source of monotonically increasing frame timestamps in milliseconds.
pub trait FrameClock {
    fn now(&self) -> f64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl FrameClock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock advanced by hand, for deterministic playback.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    pub time_ms: f64,
}

impl ManualClock {
    pub fn reset(&mut self) {
        self.time_ms = 0.0;
    }

    pub fn advance(&mut self, delta: f64) {
        self.time_ms = (self.time_ms + delta).max(0.0);
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        self.time_ms
    }
}

/// Frames-per-second estimate from consecutive frame timestamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStats {
    last_frame: Option<f64>,
    fps: u32,
}

impl FrameStats {
    pub fn record(&mut self, now: f64) {
        if let Some(last) = self.last_frame {
            let delta = now - last;
            if delta > 0.0 {
                self.fps = (1000.0 / delta).trunc() as u32;
            }
        }
        self.last_frame = Some(now);
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Shared flag that stops a [`FrameScheduler`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives a per-frame callback at a fixed refresh interval until the callback
/// breaks or the token is cancelled.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    token: CancellationToken,
}

impl FrameScheduler {
    pub fn new(frame_interval_ms: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(frame_interval_ms.max(0.0) / 1000.0),
            token: CancellationToken::new(),
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval.as_secs_f64() * 1000.0
    }

    /// Handle that can stop the loop from elsewhere, e.g. an input thread.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Tears the loop down. No frame starts after this returns.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Runs in real time, sleeping out the remainder of each frame. Returns the
    /// number of frames delivered.
    pub fn run<C, F>(&self, clock: &C, mut on_frame: F) -> u64
    where
        C: FrameClock,
        F: FnMut(f64) -> ControlFlow<()>,
    {
        let mut frames = 0;
        while !self.token.is_cancelled() {
            let started = Instant::now();
            frames += 1;
            if on_frame(clock.now()).is_break() {
                break;
            }
            if let Some(rest) = self.interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        frames
    }

    /// Runs against a manual clock, advancing it one interval per frame
    /// without sleeping.
    pub fn run_simulated<F>(
        &self,
        clock: &mut ManualClock,
        max_frames: u64,
        mut on_frame: F,
    ) -> u64
    where
        F: FnMut(f64) -> ControlFlow<()>,
    {
        let mut frames = 0;
        while frames < max_frames && !self.token.is_cancelled() {
            frames += 1;
            if on_frame(clock.now()).is_break() {
                break;
            }
            clock.advance(self.interval_ms());
        }
        frames
    }
}
