//! # Event Bus System
//!
//! Typed, broadcast event delivery between the catalog, the playback
//! controller and whoever hosts them (UI layer, analytics, tests).
//!
//! ## Overview
//!
//! - **Event Types**: `CoreEvent` wraps one enum per domain
//! - **EventBus**: broadcast channel for publishing events
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌────────────────┐  emit  ┌──────────┐  subscribe  ┌────────────┐
//! │ CatalogLoader  ├───────>│          ├────────────>│ Mini-player│
//! └────────────────┘        │ EventBus │             └────────────┘
//! ┌────────────────┐  emit  │          │  subscribe  ┌────────────┐
//! │ PlaybackCtrl   ├───────>│          ├────────────>│ Logger     │
//! └────────────────┘        └──────────┘             └────────────┘
//! ```
//!
//! The continuously updated playback state itself is published on a `watch`
//! channel by the controller; the bus carries discrete transitions.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
//!
//! # #[core_async::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(CoreEvent::Catalog(CatalogEvent::Loaded {
//!     total_units: 24,
//!     grade_count: 6,
//! }))
//! .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Catalog loaded");
//! # }
//! ```
//!
//! ## Delivery
//!
//! Slow subscribers receive `RecvError::Lagged` rather than blocking
//! publishers. Publishing with no subscribers is not an error worth acting on;
//! callers discard the `SendError`.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError, TryRecvError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog loading events
    Catalog(CatalogEvent),
    /// Playback transitions
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Severity used for filtering and logging.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Catalog(CatalogEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Catalog(CatalogEvent::FolderSkipped { .. }) => EventSeverity::Warning,
            CoreEvent::Catalog(CatalogEvent::Loaded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. })
            | CoreEvent::Playback(PlaybackEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events raised while building the lesson catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A load finished and the catalog cache was replaced.
    Loaded {
        /// Units in the catalog after de-duplication.
        total_units: usize,
        /// Distinct grades present.
        grade_count: usize,
    },
    /// One grade/category folder could not be listed and counts as empty.
    FolderSkipped { folder: String, reason: String },
    /// The asset store itself was unusable; no catalog was produced.
    LoadFailed { message: String },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::Loaded { .. } => "Catalog loaded",
            CatalogEvent::FolderSkipped { .. } => "Catalog folder skipped",
            CatalogEvent::LoadFailed { .. } => "Catalog load failed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Discrete playback transitions, keyed by unit id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A unit started playing from the beginning.
    Started {
        unit_id: String,
        /// Display title shown on the mini-player.
        title: String,
        duration_ms: u64,
    },
    Paused {
        unit_id: String,
        position_ms: u64,
    },
    Resumed {
        unit_id: String,
        position_ms: u64,
    },
    /// Playback was stopped or released by the caller.
    Stopped { unit_id: Option<String> },
    /// The unit played to its end.
    Completed { unit_id: String },
    /// Periodic refresh or seek.
    PositionChanged {
        unit_id: String,
        position_ms: u64,
        duration_ms: u64,
    },
    /// Playback failed; the controller is in its error state.
    Error {
        unit_id: Option<String>,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Unit completed",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }

    /// Unit the event refers to, when known.
    pub fn unit_id(&self) -> Option<&str> {
        match self {
            PlaybackEvent::Started { unit_id, .. }
            | PlaybackEvent::Paused { unit_id, .. }
            | PlaybackEvent::Resumed { unit_id, .. }
            | PlaybackEvent::Completed { unit_id }
            | PlaybackEvent::PositionChanged { unit_id, .. } => Some(unit_id),
            PlaybackEvent::Stopped { unit_id } | PlaybackEvent::Error { unit_id, .. } => {
                unit_id.as_deref()
            }
        }
    }
}

impl fmt::Display for CoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast bus for [`CoreEvent`]s. Cloning shares the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus whose subscribers may fall `capacity` events behind
    /// before lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event; returns the number of receivers.
    ///
    /// Fails only when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// New receiver for all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// `broadcast::Receiver` wrapper that skips events failing a predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by [`recv`](Self::recv).
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the stream fell behind by `n` events,
    /// `RecvError::Closed` once every bus clone is dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            match &self.filter {
                Some(filter) if !filter(&event) => continue,
                _ => return Ok(event),
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing
    /// matching is queued. Lag is skipped over to the oldest retained event.
    pub fn try_recv(&mut self) -> Option<CoreEvent> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            };
            match &self.filter {
                Some(filter) if !filter(&event) => continue,
                _ => return Some(event),
            }
        }
    }
}
