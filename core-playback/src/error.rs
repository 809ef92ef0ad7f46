//! # Playback Error Types
//!
//! Failures inside the playback controller. None of these reach callers of the
//! public control operations; the controller turns them into an error state.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur while driving the native player.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The unit's asset could not be opened.
    #[error("Failed to open audio source: {0}")]
    SourceError(String),

    /// Attempted operation when no unit is loaded.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Error reported by the native bridge.
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the asset itself is the problem rather than the engine.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::SourceError(_) | PlaybackError::Bridge(BridgeError::NotFound(_))
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
