//! Workspace umbrella crate.
//!
//! Re-exports [`core_service`] behind the `desktop-shims` feature so a host
//! can depend on `lesson-audio-workspace` alone and get the directory-backed
//! asset store and headless player wired in.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
