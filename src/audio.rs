//! Sound cues.
//!
//! The session only names cues; an [`AudioSink`] decides what playing one
//! means. The terminal client has no mixer, so [`TerminalAudio`] logs every
//! cue and rings the bell when a game ends.

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    Click,
    Move,
    Win,
    Lose,
}

impl SoundEvent {
    pub fn name(self) -> &'static str {
        match self {
            SoundEvent::Click => "click",
            SoundEvent::Move => "move",
            SoundEvent::Win => "win",
            SoundEvent::Lose => "lose",
        }
    }
}

impl fmt::Display for SoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fire-and-forget sound output. Shared between the UI thread and sessions.
pub trait AudioSink: Send + Sync {
    fn play(&self, event: SoundEvent);

    fn set_music_volume(&self, _volume: f32) {}

    fn set_sfx_volume(&self, _volume: f32) {}
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, _event: SoundEvent) {}
}

#[derive(Debug, Clone, Copy)]
struct Volumes {
    music: f32,
    sfx: f32,
}

#[derive(Debug)]
pub struct TerminalAudio {
    bell: bool,
    volumes: Mutex<Volumes>,
}

impl TerminalAudio {
    pub fn new(bell: bool, music_volume: f32, sfx_volume: f32) -> Self {
        TerminalAudio {
            bell,
            volumes: Mutex::new(Volumes {
                music: music_volume,
                sfx: sfx_volume,
            }),
        }
    }

    pub fn music_volume(&self) -> f32 {
        self.volumes.lock().music
    }

    pub fn sfx_volume(&self) -> f32 {
        self.volumes.lock().sfx
    }
}

impl AudioSink for TerminalAudio {
    fn play(&self, event: SoundEvent) {
        let sfx = self.sfx_volume();
        debug!(cue = event.name(), volume = sfx, "sound");
        if self.bell && sfx > 0.0 && matches!(event, SoundEvent::Win | SoundEvent::Lose) {
            let mut out = std::io::stdout();
            // A failed bell is not worth interrupting the game for.
            let _ = out.write_all(b"\x07").and_then(|()| out.flush());
        }
    }

    fn set_music_volume(&self, volume: f32) {
        self.volumes.lock().music = volume.clamp(0.0, 1.0);
    }

    fn set_sfx_volume(&self, volume: f32) {
        self.volumes.lock().sfx = volume.clamp(0.0, 1.0);
    }
}

/// Records cues in order; used by tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    events: Mutex<Vec<SoundEvent>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SoundEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: SoundEvent) -> usize {
        self.events.lock().iter().filter(|&&e| e == event).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, event: SoundEvent) {
        self.events.lock().push(event);
    }
}
