//! Observable playback state.

use core_catalog::AudioFile;
use serde::{Deserialize, Serialize};

/// What the mini-player shows. Exactly one variant is current at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    Playing {
        file: AudioFile,
        position_ms: u64,
        duration_ms: u64,
    },
    Paused {
        file: AudioFile,
        position_ms: u64,
        duration_ms: u64,
    },
    /// Playback failed; no native handle is held.
    Error { message: String },
}

impl PlaybackState {
    pub fn current_file(&self) -> Option<&AudioFile> {
        match self {
            PlaybackState::Playing { file, .. } | PlaybackState::Paused { file, .. } => Some(file),
            PlaybackState::Idle | PlaybackState::Error { .. } => None,
        }
    }

    pub fn position_ms(&self) -> u64 {
        match self {
            PlaybackState::Playing { position_ms, .. }
            | PlaybackState::Paused { position_ms, .. } => *position_ms,
            _ => 0,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            PlaybackState::Playing { duration_ms, .. }
            | PlaybackState::Paused { duration_ms, .. } => *duration_ms,
            _ => 0,
        }
    }

    /// Playing or paused, i.e. a unit is loaded.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Playing { .. } | PlaybackState::Paused { .. }
        )
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PlaybackState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Slider position in `0.0..=1.0`; zero while the duration is unknown.
    pub fn progress(&self) -> f32 {
        let duration = self.duration_ms();
        if duration == 0 {
            return 0.0;
        }
        (self.position_ms() as f64 / duration as f64).clamp(0.0, 1.0) as f32
    }

    /// Same case and file with a new position.
    pub(crate) fn with_position(&self, position: u64) -> PlaybackState {
        match self {
            PlaybackState::Playing {
                file, duration_ms, ..
            } => PlaybackState::Playing {
                file: file.clone(),
                position_ms: position,
                duration_ms: *duration_ms,
            },
            PlaybackState::Paused {
                file, duration_ms, ..
            } => PlaybackState::Paused {
                file: file.clone(),
                position_ms: position,
                duration_ms: *duration_ms,
            },
            other => other.clone(),
        }
    }
}
