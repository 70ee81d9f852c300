//! Audio abstraction.
//!
//! Sounds are addressed by asset key. Mixing and streaming belong to the
//! engine; [`HeadlessAudio`] records what was asked of it.

use std::collections::HashSet;

/// Channel class for a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Music,
    Sfx,
}

/// Audio playback used by scenes.
pub trait AudioBackend {
    fn play_sound(&mut self, key: &str, kind: SoundKind, looping: bool);
    /// Stops a sound effect if it is playing.
    fn stop_sfx(&mut self, key: &str);
    fn is_playing(&self, key: &str) -> bool;
}

/// One recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Play {
        key: String,
        kind: SoundKind,
        looping: bool,
    },
    Stop {
        key: String,
    },
}

/// Audio backend that plays nothing and remembers everything.
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    playing: HashSet<String>,
    calls: Vec<AudioCall>,
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[AudioCall] {
        &self.calls
    }
}

impl AudioBackend for HeadlessAudio {
    fn play_sound(&mut self, key: &str, kind: SoundKind, looping: bool) {
        self.playing.insert(key.to_string());
        self.calls.push(AudioCall::Play {
            key: key.to_string(),
            kind,
            looping,
        });
    }

    fn stop_sfx(&mut self, key: &str) {
        self.playing.remove(key);
        self.calls.push(AudioCall::Stop {
            key: key.to_string(),
        });
    }

    fn is_playing(&self, key: &str) -> bool {
        self.playing.contains(key)
    }
}
