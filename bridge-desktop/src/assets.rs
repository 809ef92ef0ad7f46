//! Asset store backed by a directory tree.

use async_trait::async_trait;
use bridge_traits::{
    assets::{AssetDescriptor, AssetStore, ASSET_PATH_SEPARATOR},
    error::{BridgeError, Result},
};
use core_async::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves the bundled lesson folders from `root/<folder>/<file>`.
///
/// Only plain files directly inside a folder are listed; nested directories
/// and non UTF-8 names are skipped.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Per-user default location, `<data dir>/lesson-audio/assets`.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join("lesson-audio")
            .join("assets")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical path onto the root, rejecting anything that could escape it.
    fn resolve(&self, logical: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in logical.split(ASSET_PATH_SEPARATOR) {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(BridgeError::NotFound(logical.to_string()));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }

    fn map_io_error(logical: &str, err: std::io::Error) -> BridgeError {
        match err.kind() {
            ErrorKind::NotFound => BridgeError::NotFound(logical.to_string()),
            _ => BridgeError::Io(err),
        }
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn probe(&self) -> Result<()> {
        match fs::metadata(&self.root).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(BridgeError::NotAvailable(format!(
                "asset root {} is not a directory",
                self.root.display()
            ))),
            Err(err) => Err(BridgeError::NotAvailable(format!(
                "asset root {} is unreadable: {err}",
                self.root.display()
            ))),
        }
    }

    async fn list(&self, folder: &str) -> Result<Vec<String>> {
        let dir = self.resolve(folder)?;
        let mut read_dir = fs::read_dir(&dir)
            .await
            .map_err(|err| Self::map_io_error(folder, err))?;

        let mut names = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|err| Self::map_io_error(folder, err))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|kind| kind.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!(folder, name = ?raw, "Skipping non UTF-8 file name"),
            }
        }

        debug!(folder, count = names.len(), "Listed asset folder");
        Ok(names)
    }

    async fn open(&self, path: &str) -> Result<AssetDescriptor> {
        let location = self.resolve(path)?;
        let metadata = fs::metadata(&location)
            .await
            .map_err(|err| Self::map_io_error(path, err))?;
        if !metadata.is_file() {
            return Err(BridgeError::NotFound(path.to_string()));
        }

        Ok(AssetDescriptor::new(path, location).with_range(0, metadata.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    struct TempRoot(PathBuf);

    impl TempRoot {
        fn new() -> Self {
            let root = env::temp_dir().join(format!("lesson-assets-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&root).unwrap();
            Self(root)
        }

        fn file(&self, relative: &str, bytes: &[u8]) -> &Self {
            let path = self.0.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, bytes).unwrap();
            self
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn test_probe_requires_directory() {
        let root = TempRoot::new();
        assert!(FsAssetStore::new(&root.0).probe().await.is_ok());

        let missing = FsAssetStore::new(root.0.join("nope"));
        assert!(matches!(
            missing.probe().await,
            Err(BridgeError::NotAvailable(_))
        ));

        root.file("plain.txt", b"x");
        let file_root = FsAssetStore::new(root.0.join("plain.txt"));
        assert!(file_root.probe().await.is_err());
    }

    #[tokio::test]
    async fn test_list_returns_file_names_only() {
        let root = TempRoot::new();
        root.file("一年级上册课本/unit 1.mp3", b"a")
            .file("一年级上册课本/unit 2.mp3", b"b")
            .file("一年级上册课本/nested/unit 3.mp3", b"c");
        let store = FsAssetStore::new(&root.0);

        let mut names = store.list("一年级上册课本").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["unit 1.mp3", "unit 2.mp3"]);
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_not_found() {
        let root = TempRoot::new();
        let store = FsAssetStore::new(&root.0);
        assert!(matches!(
            store.list("二年级上册单词").await,
            Err(BridgeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_open_resolves_under_root() {
        let root = TempRoot::new();
        root.file("一年级上册课本/unit 1.mp3", b"0123456789");
        let store = FsAssetStore::new(&root.0);

        let asset = store.open("一年级上册课本/unit 1.mp3").await.unwrap();
        assert_eq!(asset.path, "一年级上册课本/unit 1.mp3");
        assert_eq!(asset.location, root.0.join("一年级上册课本").join("unit 1.mp3"));
        assert_eq!(asset.length, Some(10));
        assert_eq!(asset.file_name(), "unit 1.mp3");
    }

    #[tokio::test]
    async fn test_open_rejects_escapes_and_directories() {
        let root = TempRoot::new();
        root.file("一年级上册课本/unit 1.mp3", b"a");
        let store = FsAssetStore::new(&root.0);

        for path in ["../secret.mp3", "一年级上册课本/../x", "/abs.mp3", "一年级上册课本"] {
            assert!(
                matches!(store.open(path).await, Err(BridgeError::NotFound(_))),
                "{path}"
            );
        }
    }
}
