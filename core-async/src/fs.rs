//! Async filesystem helpers.
//!
//! Thin re-export of `tokio::fs` limited to what read-only asset stores need.

pub use tokio::fs::{metadata, read, read_dir, DirEntry, File};
