//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the lesson audio crates:
//! - Logging and tracing setup
//! - Configuration and bridge injection
//! - Event bus
//!
//! Nothing here knows about grades, units or players beyond the event
//! payloads; domain logic lives in `core-catalog` and `core-playback`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
