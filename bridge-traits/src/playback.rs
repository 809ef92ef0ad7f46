//! Native media player bridge.
//!
//! The core drives exactly one platform player handle at a time through
//! [`NativePlayer`]. Control calls are synchronous and expected to be fast; the
//! handle reports natural completion and playback errors asynchronously
//! through the [`PlayerEventSink`] it was created with.

use core_async::sync::mpsc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::assets::AssetDescriptor;
use crate::error::Result;

/// Identifier of one native handle, from creation until release.
///
/// Events carry the id of the handle that produced them so a controller can
/// drop callbacks from handles it already released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSessionId(Uuid);

impl PlayerSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlayerSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asynchronous notification raised by a native handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NativePlayerEvent {
    /// Playback reached the end of the asset.
    Completed,
    /// The engine failed; `what` and `extra` are platform error codes.
    Error { what: i32, extra: i32 },
}

/// Receiving half of the native event channel, owned by the controller.
pub type NativeEventReceiver = mpsc::UnboundedReceiver<(PlayerSessionId, NativePlayerEvent)>;

/// Create the channel native handles report through.
pub fn native_event_channel() -> (
    mpsc::UnboundedSender<(PlayerSessionId, NativePlayerEvent)>,
    NativeEventReceiver,
) {
    mpsc::unbounded_channel()
}

/// Callback handle given to a native player at creation.
#[derive(Debug, Clone)]
pub struct PlayerEventSink {
    session: PlayerSessionId,
    tx: mpsc::UnboundedSender<(PlayerSessionId, NativePlayerEvent)>,
}

impl PlayerEventSink {
    pub fn new(
        session: PlayerSessionId,
        tx: mpsc::UnboundedSender<(PlayerSessionId, NativePlayerEvent)>,
    ) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> PlayerSessionId {
        self.session
    }

    /// Report natural end of playback. Returns `false` once nobody listens.
    pub fn completed(&self) -> bool {
        self.emit(NativePlayerEvent::Completed)
    }

    /// Report an engine failure. Returns `false` once nobody listens.
    pub fn error(&self, what: i32, extra: i32) -> bool {
        self.emit(NativePlayerEvent::Error { what, extra })
    }

    fn emit(&self, event: NativePlayerEvent) -> bool {
        self.tx.send((self.session, event)).is_ok()
    }
}

/// Control surface of one platform media player handle.
///
/// Implementations wrap the host engine (Android `MediaPlayer`, AVFoundation,
/// a desktop decoder). Positions and durations are in milliseconds.
pub trait NativePlayer: Send {
    /// Load the asset and get ready to start. Blocks until prepared.
    fn prepare(&mut self) -> Result<()>;

    /// Start or continue playback.
    fn start(&mut self) -> Result<()>;

    /// Pause without releasing the handle.
    fn pause(&mut self) -> Result<()>;

    /// Stop playback. The handle must be prepared again before restarting.
    fn stop(&mut self) -> Result<()>;

    /// Move the playback position.
    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    /// Whether the engine is currently producing audio.
    fn is_playing(&self) -> bool;

    /// Current playback position.
    fn position_ms(&self) -> Result<u64>;

    /// Total duration of the prepared asset, `0` when unknown.
    fn duration_ms(&self) -> Result<u64>;

    /// Free native resources. Safe to call more than once.
    fn release(&mut self);
}

/// Opens native player handles for assets.
pub trait NativePlayerFactory: Send + Sync {
    /// Create an unprepared handle bound to `asset`. The handle reports
    /// completion and errors through `events`.
    fn create(
        &self,
        asset: &AssetDescriptor,
        events: PlayerEventSink,
    ) -> Result<Box<dyn NativePlayer>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_unique() {
        let a = PlayerSessionId::new();
        let b = PlayerSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, PlayerSessionId::from_uuid(*a.as_uuid()));
    }

    #[tokio::test]
    async fn sink_tags_events_with_session() {
        let (tx, mut rx) = native_event_channel();
        let session = PlayerSessionId::new();
        let sink = PlayerEventSink::new(session, tx);

        assert!(sink.completed());
        assert!(sink.error(1, -1004));

        assert_eq!(
            rx.recv().await,
            Some((session, NativePlayerEvent::Completed))
        );
        assert_eq!(
            rx.recv().await,
            Some((session, NativePlayerEvent::Error { what: 1, extra: -1004 }))
        );
    }

    #[test]
    fn sink_reports_closed_channel() {
        let (tx, rx) = native_event_channel();
        let sink = PlayerEventSink::new(PlayerSessionId::new(), tx);
        drop(rx);
        assert!(!sink.completed());
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let json = serde_json::to_string(&NativePlayerEvent::Error { what: 1, extra: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"Error","what":1,"extra":2}"#);
    }
}
