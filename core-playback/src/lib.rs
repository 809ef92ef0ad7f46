//! # Lesson Playback
//!
//! Playback state machine for the lesson mini-player.
//!
//! ## Overview
//!
//! This crate handles:
//! - The [`PlaybackController`] owning the single native player handle
//! - The observable [`PlaybackState`] published on a `watch` channel
//! - A cancellable repeating task that refreshes position and duration
//! - `MM:SS` helpers for the progress labels
//!
//! ## Example
//!
//! ```rust,no_run
//! use core_playback::{PlaybackConfig, PlaybackController, PlaybackState};
//! # use std::sync::Arc;
//! # async fn example(
//! #     factory: Arc<dyn bridge_traits::NativePlayerFactory>,
//! #     store: Arc<dyn bridge_traits::AssetStore>,
//! #     unit: core_catalog::AudioFile,
//! # ) -> core_playback::Result<()> {
//! let controller = PlaybackController::new(factory, store, PlaybackConfig::default(), None)?;
//! let mut states = controller.subscribe();
//!
//! controller.play(unit).await;
//! while states.changed().await.is_ok() {
//!     if let PlaybackState::Playing { position_ms, .. } = &*states.borrow() {
//!         println!("{}", core_playback::format_time(*position_ms));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod refresh;
pub mod state;
pub mod time_format;

pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use state::PlaybackState;
pub use time_format::{format_time, parse_time};
