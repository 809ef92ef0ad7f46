//! Synchronization primitives.
//!
//! Async-aware tokio primitives plus the cooperative [`CancellationToken`]
//! used to stop repeating background tasks.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, Mutex};
//!
//! async fn example() {
//!     let counter = Mutex::new(0u32);
//!     *counter.lock().await += 1;
//!
//!     let (tx, rx) = watch::channel("idle");
//!     tx.send_replace("playing");
//!     assert_eq!(*rx.borrow(), "playing");
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

pub use tokio_util::sync::CancellationToken;
