//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (asset store, native
//! player) into the lesson catalog and the playback controller. Desktop apps
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`); mobile hosts inject their own bridges through
//! [`CoreConfig`].

pub mod error;
pub mod view;

pub use error::{CoreError, Result};
pub use view::UnitListState;

pub use core_catalog::{AudioFile, Category, Grade, UnitId};
pub use core_playback::{format_time, parse_time, PlaybackState};
pub use core_runtime::config::CoreConfig;
pub use core_runtime::events::{CoreEvent, EventStream};

use std::sync::Arc;

use core_async::sync::watch;
use core_catalog::{CatalogLoader, CatalogRepository, InMemoryCatalogRepository, LibraryError};
use core_playback::{PlaybackConfig, PlaybackController};
use core_runtime::events::EventBus;
use tracing::{info, instrument, warn};

struct ServiceInner {
    config: CoreConfig,
    events: EventBus,
    catalog: Arc<dyn CatalogRepository>,
    playback: PlaybackController,
}

/// Primary façade exposed to host applications.
///
/// Cheap to clone; all clones share one catalog and one playback controller.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

impl CoreService {
    /// Create a service over the bridges in `config`. The catalog is loaded on
    /// first use. Must be called from within a runtime.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let events = EventBus::new(config.event_buffer_size);
        let loader = CatalogLoader::from_config(&config).with_event_bus(events.clone());
        let catalog = Arc::new(InMemoryCatalogRepository::new(loader));
        Self::with_catalog(config, events, catalog)
    }

    /// Create a service around an existing catalog repository.
    pub fn with_catalog(
        config: CoreConfig,
        events: EventBus,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Result<Self> {
        let playback = PlaybackController::new(
            Arc::clone(&config.player_factory),
            Arc::clone(&config.asset_store),
            PlaybackConfig::from_core(&config),
            Some(events.clone()),
        )?;

        info!(
            refresh_interval = ?config.refresh_interval,
            extensions = ?config.audio_extensions,
            "Core service created"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                events,
                catalog,
                playback,
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Rescan the asset store.
    pub async fn load_catalog(&self) -> Result<()> {
        Ok(self.inner.catalog.load_catalog().await?)
    }

    pub async fn list_grades(&self) -> Result<Vec<Grade>> {
        Ok(self.inner.catalog.list_grades().await?)
    }

    pub async fn list_categories(&self, grade: Grade) -> Result<Vec<Category>> {
        Ok(self.inner.catalog.list_categories(grade).await?)
    }

    pub async fn list_units(&self, grade: Grade, category: Category) -> Result<Vec<AudioFile>> {
        Ok(self.inner.catalog.list_units(grade, category).await?)
    }

    pub async fn find_unit(
        &self,
        grade: Grade,
        category: Category,
        unit_number: u32,
    ) -> Result<Option<AudioFile>> {
        Ok(self
            .inner
            .catalog
            .find_unit(grade, category, unit_number)
            .await?)
    }

    /// Unit list of one (grade, category) pair as a screen state.
    pub async fn load_units_view(&self, grade: Grade, category: Category) -> UnitListState {
        UnitListState::from_result(self.inner.catalog.list_units(grade, category).await)
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    pub async fn play(&self, file: AudioFile) {
        self.inner.playback.play(file).await;
    }

    /// Look a unit up and play it.
    #[instrument(skip(self))]
    pub async fn play_unit(&self, grade: Grade, category: Category, unit_number: u32) -> Result<()> {
        let file = self
            .find_unit(grade, category, unit_number)
            .await?
            .ok_or_else(|| LibraryError::NotFound {
                entity_type: "unit".to_string(),
                id: UnitId::new(grade, category, unit_number).to_string(),
            })?;
        self.play(file).await;
        Ok(())
    }

    pub async fn pause(&self) {
        self.inner.playback.pause().await;
    }

    pub async fn resume(&self) {
        self.inner.playback.resume().await;
    }

    pub async fn toggle_play_pause(&self) {
        self.inner.playback.toggle_play_pause().await;
    }

    pub async fn stop(&self) {
        self.inner.playback.stop().await;
    }

    pub async fn seek_to(&self, position_ms: u64) {
        self.inner.playback.seek_to(position_ms).await;
    }

    pub async fn release(&self) {
        self.inner.playback.release().await;
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.inner.playback.state()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackState> {
        self.inner.playback.subscribe()
    }

    /// Stream of catalog and playback events.
    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.inner.events.subscribe())
    }
}

/// Create a service and warm its catalog.
///
/// A failed initial load is logged and not returned; the next catalog query
/// retries it.
pub async fn bootstrap(config: CoreConfig) -> Result<CoreService> {
    let service = CoreService::new(config)?;
    if let Err(err) = service.load_catalog().await {
        warn!(error = %err, "Initial catalog load failed");
    }
    Ok(service)
}

/// Convenience bootstrapper for desktop hosts serving lessons from a directory.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let core = core_service::bootstrap_desktop("/opt/lessons").await?;
/// let grades = core.list_grades().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(asset_root: impl Into<std::path::PathBuf>) -> Result<CoreService> {
    let config = CoreConfig::builder()
        .asset_root(asset_root)
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    bootstrap(config).await
}
