//! Read-only bundled asset access.
//!
//! Lesson audio ships inside the host application as a flat two-level
//! namespace: one folder per (grade, category) pair, each holding the audio
//! files for that pair. Hosts expose it through [`AssetStore`]; Android would
//! wrap `AssetManager`, desktop serves a directory.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// Separator used between folder and file name in logical asset paths.
pub const ASSET_PATH_SEPARATOR: char = '/';

/// Join a folder name and a file name into a logical asset path.
///
/// ```
/// use bridge_traits::assets::asset_path;
///
/// assert_eq!(asset_path("一年级上册课本", "unit 1.mp3"), "一年级上册课本/unit 1.mp3");
/// ```
pub fn asset_path(folder: &str, file_name: &str) -> String {
    format!("{folder}{ASSET_PATH_SEPARATOR}{file_name}")
}

/// Resolved location of a single asset, handed to the native player.
///
/// Mirrors a file descriptor plus byte range: bundled assets may live inside a
/// larger container (an APK, a resource pack), so a player must honour
/// `start_offset` and `length` rather than reading the whole `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Logical path inside the asset namespace.
    pub path: String,
    /// Host location the native player reads from.
    pub location: PathBuf,
    /// Byte offset of the asset within `location`.
    pub start_offset: u64,
    /// Asset length in bytes, when known.
    pub length: Option<u64>,
}

impl AssetDescriptor {
    /// Describe an asset that occupies the whole of `location`.
    pub fn new(path: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            location: location.into(),
            start_offset: 0,
            length: None,
        }
    }

    /// Restrict the descriptor to a byte range of `location`.
    pub fn with_range(mut self, start_offset: u64, length: u64) -> Self {
        self.start_offset = start_offset;
        self.length = Some(length);
        self
    }

    /// File name component of the logical path.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(ASSET_PATH_SEPARATOR)
            .next()
            .unwrap_or(self.path.as_str())
    }
}

/// Read-only asset namespace provided by the host.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::assets::AssetStore;
///
/// async fn count_lessons(store: &dyn AssetStore) -> usize {
///     store.list("一年级上册课本").await.map(|files| files.len()).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Check that the store itself can be enumerated.
    ///
    /// Fails only for systemic problems such as a missing asset root. A missing
    /// individual folder is not a probe failure.
    async fn probe(&self) -> Result<()> {
        Ok(())
    }

    /// List the file names (not paths) directly inside `folder`.
    async fn list(&self, folder: &str) -> Result<Vec<String>>;

    /// Resolve a logical asset path for playback.
    async fn open(&self, path: &str) -> Result<AssetDescriptor>;
}
