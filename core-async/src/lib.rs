//! Async runtime facade for the lesson audio core.
//!
//! Every `core-*` and `bridge-*` crate goes through this crate for tasks,
//! timers and synchronization instead of naming tokio directly. Swapping or
//! tuning the executor then only touches one place.
//!
//! # Modules
//!
//! - `task`: task spawning
//! - `time`: sleep, intervals, timeouts
//! - `sync`: mutexes, channels and cancellation tokens
//! - `fs`: async filesystem access used by directory-backed asset stores
//! - `runtime`: blocking entry points for tests and binaries
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{interval, Duration};
//!
//! async fn tick_until_cancelled(token: CancellationToken) {
//!     let mut ticker = interval(Duration::from_millis(100));
//!     loop {
//!         core_async::select! {
//!             _ = token.cancelled() => break,
//!             _ = ticker.tick() => {}
//!         }
//!     }
//! }
//! ```

// Entry-point/test macros so downstream crates never depend on tokio's.
pub use core_async_macros::{main, test};

pub mod fs;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Re-exported so `select!` can be used without a direct tokio dependency.
pub use tokio::select;
