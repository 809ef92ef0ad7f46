//! # Core Configuration Module
//!
//! Builder-based configuration for the lesson audio core.
//!
//! ## Overview
//!
//! `CoreConfig` carries the host bridges the core cannot work without and the
//! few tunables of catalog loading and playback. The builder fails fast with
//! an actionable message when a bridge is missing or a value is out of range.
//!
//! ## Required Bridges
//!
//! - `AssetStore` - Bundled lesson files (desktop default: `FsAssetStore` over `asset_root`)
//! - `NativePlayerFactory` - Platform media player (desktop default: `HeadlessPlayerFactory`)
//!
//! When the `desktop-shims` feature is enabled both defaults are injected if
//! not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .asset_root("/opt/lesson-player/assets")
//!     .refresh_interval(Duration::from_millis(250))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Neither an asset store nor an asset root to build one from
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - no asset source");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AssetStore, NativePlayerFactory};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default period of the playback position refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(100);
/// Fastest refresh period accepted.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(10);
/// Slowest refresh period accepted.
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
/// Default capacity of the event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;
/// Extensions recognised as lesson audio when none are configured.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["mp3"];

/// Core configuration for the lesson audio core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root directory of bundled assets, when served from the filesystem
    pub asset_root: Option<PathBuf>,

    /// Read-only lesson asset namespace
    pub asset_store: Arc<dyn AssetStore>,

    /// Opens native player handles
    pub player_factory: Arc<dyn NativePlayerFactory>,

    /// Lower-case extensions (without dot) loaded into the catalog
    pub audio_extensions: Vec<String>,

    /// Period of the playback state refresh task
    pub refresh_interval: Duration,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("asset_root", &self.asset_root)
            .field("asset_store", &"AssetStore { ... }")
            .field("player_factory", &"NativePlayerFactory { ... }")
            .field("audio_extensions", &self.audio_extensions)
            .field("refresh_interval", &self.refresh_interval)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates value ranges.
    ///
    /// - Refresh interval within 10ms..=5s
    /// - At least one non-empty audio extension
    /// - Event buffer size greater than zero
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval < MIN_REFRESH_INTERVAL {
            return Err(Error::Config(format!(
                "Refresh interval {:?} is below the minimum of {:?}",
                self.refresh_interval, MIN_REFRESH_INTERVAL
            )));
        }

        if self.refresh_interval > MAX_REFRESH_INTERVAL {
            return Err(Error::Config(format!(
                "Refresh interval {:?} exceeds the maximum of {:?}",
                self.refresh_interval, MAX_REFRESH_INTERVAL
            )));
        }

        if self.audio_extensions.is_empty() {
            return Err(Error::Config(
                "At least one audio extension is required".to_string(),
            ));
        }

        if self.audio_extensions.iter().any(|ext| ext.is_empty()) {
            return Err(Error::Config(
                "Audio extensions cannot be empty strings".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether `file_name` carries one of the configured audio extensions.
    ///
    /// Matching ignores ASCII case.
    pub fn is_audio_file(&self, file_name: &str) -> bool {
        has_audio_extension(file_name, &self.audio_extensions)
    }
}

/// Case-insensitive extension check against a list of dot-less extensions.
pub fn has_audio_extension(file_name: &str, extensions: &[String]) -> bool {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(not(feature = "desktop-shims"))]
fn asset_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AssetStore".to_string(),
        message: "An AssetStore implementation is required to read bundled lessons. \
                 Desktop: enable the 'desktop-shims' feature and set asset_root. \
                 Mobile: inject the platform asset manager adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn player_factory_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "NativePlayerFactory".to_string(),
        message: "A NativePlayerFactory implementation is required for playback. \
                 Desktop: enable the 'desktop-shims' feature. \
                 Mobile: inject the platform media player adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_asset_store(asset_root: Option<&PathBuf>) -> Result<Arc<dyn AssetStore>> {
    use bridge_desktop::FsAssetStore;

    let root = asset_root.ok_or_else(|| {
        Error::Config(
            "Asset root is required when no AssetStore is injected. Use .asset_root() to set it."
                .to_string(),
        )
    })?;

    let store: Arc<dyn AssetStore> = Arc::new(FsAssetStore::new(root.clone()));
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_asset_store(_asset_root: Option<&PathBuf>) -> Result<Arc<dyn AssetStore>> {
    Err(asset_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_player_factory() -> Result<Arc<dyn NativePlayerFactory>> {
    use bridge_desktop::HeadlessPlayerFactory;

    let factory: Arc<dyn NativePlayerFactory> = Arc::new(HeadlessPlayerFactory::new());
    Ok(factory)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_player_factory() -> Result<Arc<dyn NativePlayerFactory>> {
    Err(player_factory_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    asset_root: Option<PathBuf>,
    asset_store: Option<Arc<dyn AssetStore>>,
    player_factory: Option<Arc<dyn NativePlayerFactory>>,
    audio_extensions: Option<Vec<String>>,
    refresh_interval: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the directory the default desktop asset store serves from.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().asset_root("/opt/lessons");
    /// ```
    pub fn asset_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.asset_root = Some(path.into());
        self
    }

    /// Injects the asset store implementation.
    pub fn asset_store(mut self, store: Arc<dyn AssetStore>) -> Self {
        self.asset_store = Some(store);
        self
    }

    /// Injects the native player factory.
    pub fn player_factory(mut self, factory: Arc<dyn NativePlayerFactory>) -> Self {
        self.player_factory = Some(factory);
        self
    }

    /// Replaces the recognised audio extensions.
    ///
    /// Leading dots are stripped and case is folded, so `".MP3"` and `"mp3"`
    /// are equivalent. Default: `["mp3"]`.
    pub fn audio_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.audio_extensions = Some(
            extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        );
        self
    }

    /// Sets the playback refresh period. Default: 100ms.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Sets the event bus capacity. Default: 100.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds and validates the final `CoreConfig`.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when a bridge is absent and no default exists
    /// - [`Error::Config`] when a value is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let asset_store = match self.asset_store {
            Some(store) => store,
            None => provide_default_asset_store(self.asset_root.as_ref())?,
        };

        let player_factory = match self.player_factory {
            Some(factory) => factory,
            None => provide_default_player_factory()?,
        };

        let config = CoreConfig {
            asset_root: self.asset_root,
            asset_store,
            player_factory,
            audio_extensions: self.audio_extensions.unwrap_or_else(|| {
                DEFAULT_AUDIO_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect()
            }),
            refresh_interval: self.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
