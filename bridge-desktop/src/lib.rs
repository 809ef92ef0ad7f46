//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FsAssetStore` serves the lesson folders from a directory using `tokio::fs`
//! - `HeadlessPlayerFactory` creates silent players that probe duration with
//!   `symphonia` and track position against a clock
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FsAssetStore, HeadlessPlayerFactory};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .asset_store(Arc::new(FsAssetStore::new("/opt/lessons")))
//!     .player_factory(Arc::new(HeadlessPlayerFactory::new()))
//!     .build()?;
//! ```

mod assets;
mod player;

pub use assets::FsAssetStore;
pub use player::{HeadlessPlayer, HeadlessPlayerFactory};
