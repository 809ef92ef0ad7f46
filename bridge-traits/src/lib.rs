//! # Host Bridge Traits
//!
//! Contracts between the lesson audio core and the host platform.
//!
//! ## Overview
//!
//! The core never touches platform APIs directly. Anything that differs per
//! host (where bundled lesson files live, which media engine plays them, where
//! logs end up) is expressed as a trait here and implemented by a bridge crate.
//!
//! ## Traits
//!
//! ### Assets
//! - [`AssetStore`](assets::AssetStore) - Read-only bundled asset namespace (`<folder>/<file>`)
//!
//! ### Playback
//! - [`NativePlayerFactory`](playback::NativePlayerFactory) - Opens a native player handle for an asset
//! - [`NativePlayer`](playback::NativePlayer) - Synchronous control surface of one handle
//! - [`PlayerEventSink`](playback::PlayerEventSink) - Completion and error callbacks from the handle
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Directory assets, headless player |
//! | Android  | TBD                 | 📋 Planned (AssetManager + MediaPlayer) |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing:
//!
//! ```ignore
//! let player_factory = config.player_factory
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "NativePlayerFactory".to_string(),
//!         message: "No native player provided. \
//!                  Desktop: enable the desktop-shims feature. \
//!                  Mobile: inject the platform media player adapter.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits report failures through [`BridgeError`](error::BridgeError).
//! Implementations should convert platform errors and keep the asset path in
//! the message.
//!
//! ## Thread Safety
//!
//! Asset stores and player factories are shared across tasks and require
//! `Send + Sync`. A single [`NativePlayer`](playback::NativePlayer) handle is
//! owned by exactly one controller and only needs `Send`.

pub mod assets;
pub mod error;
pub mod playback;
pub mod time;

pub use error::BridgeError;

pub use assets::{AssetDescriptor, AssetStore};
pub use playback::{
    native_event_channel, NativeEventReceiver, NativePlayer, NativePlayerEvent,
    NativePlayerFactory, PlayerEventSink, PlayerSessionId,
};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
