use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TickReport;

/// The four pre-loaded clips the game plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clip {
    AmbientLoop,
    OutgoingCue,
    IncomingCue,
    GameOver,
}

impl Clip {
    pub const ALL: [Clip; 4] = [
        Clip::AmbientLoop,
        Clip::OutgoingCue,
        Clip::IncomingCue,
        Clip::GameOver,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Clip::AmbientLoop => "loop",
            Clip::OutgoingCue => "ball-outgoing",
            Clip::IncomingCue => "ball-incoming",
            Clip::GameOver => "game-over",
        }
    }

    pub fn volume(self) -> f32 {
        match self {
            Clip::AmbientLoop => 0.2,
            _ => 0.8,
        }
    }

    pub fn looping(self) -> bool {
        self == Clip::AmbientLoop
    }
}

/// Playback primitives provided by the host.
pub trait AudioSink {
    fn play(&mut self, clip: Clip);
    fn stop(&mut self, clip: Clip);
    fn set_playback_rate(&mut self, clip: Clip, rate: f64);
}

impl<T: AudioSink + ?Sized> AudioSink for Box<T> {
    fn play(&mut self, clip: Clip) {
        (**self).play(clip)
    }

    fn stop(&mut self, clip: Clip) {
        (**self).stop(clip)
    }

    fn set_playback_rate(&mut self, clip: Clip, rate: f64) {
        (**self).set_playback_rate(clip, rate)
    }
}

/// A single command issued to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AudioCommand {
    Play(Clip),
    Stop(Clip),
    SetRate(Clip, f64),
}

/// Sink that only logs what it would play.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudioSink;

impl AudioSink for TracingAudioSink {
    fn play(&mut self, clip: Clip) {
        debug!(
            clip = clip.id(),
            volume = clip.volume(),
            looping = clip.looping(),
            "play"
        );
    }

    fn stop(&mut self, clip: Clip) {
        debug!(clip = clip.id(), "stop");
    }

    fn set_playback_rate(&mut self, clip: Clip, rate: f64) {
        debug!(clip = clip.id(), rate, "set playback rate");
    }
}

/// Sink that records every command, used to observe the coordinator.
#[derive(Debug, Default, Clone)]
pub struct RecordingAudioSink {
    commands: Vec<AudioCommand>,
}

impl RecordingAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[AudioCommand] {
        &self.commands
    }

    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl AudioSink for RecordingAudioSink {
    fn play(&mut self, clip: Clip) {
        self.commands.push(AudioCommand::Play(clip));
    }

    fn stop(&mut self, clip: Clip) {
        self.commands.push(AudioCommand::Stop(clip));
    }

    fn set_playback_rate(&mut self, clip: Clip, rate: f64) {
        self.commands.push(AudioCommand::SetRate(clip, rate));
    }
}

/// Translates engine reports into playback commands. Owns the sink for as
/// long as the game runs; dropping it stops every clip.
#[derive(Debug)]
pub struct AudioCoordinator<A: AudioSink> {
    sink: A,
}

impl<A: AudioSink> AudioCoordinator<A> {
    /// Takes ownership of the sink and starts the ambient loop.
    pub fn new(mut sink: A) -> Self {
        sink.play(Clip::AmbientLoop);
        Self { sink }
    }

    /// Restores the base tempo for a fresh session.
    pub fn session_started(&mut self) {
        self.set_all_rates(1.0);
    }

    /// Reacts to the side effects of one engine frame.
    pub fn on_tick(&mut self, report: &TickReport) {
        if let Some(round) = &report.round_started {
            self.set_all_rates(round.difficulty.rate_multiplier);
            self.sink.play(Clip::OutgoingCue);
        }
        if report.cue_fired {
            self.sink.play(Clip::IncomingCue);
        }
        if report.outcome.is_terminal() {
            self.sink.play(Clip::GameOver);
            self.sink.set_playback_rate(Clip::AmbientLoop, 1.0);
        }
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut A {
        &mut self.sink
    }

    fn set_all_rates(&mut self, rate: f64) {
        for clip in Clip::ALL {
            self.sink.set_playback_rate(clip, rate);
        }
    }
}

impl<A: AudioSink> Drop for AudioCoordinator<A> {
    fn drop(&mut self) {
        for clip in Clip::ALL {
            self.sink.stop(clip);
        }
    }
}
