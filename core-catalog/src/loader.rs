//! Catalog loading from the bundled asset store.

use std::collections::BTreeMap;
use std::sync::Arc;

use bridge_traits::AssetStore;
use core_runtime::config::{has_audio_extension, CoreConfig, DEFAULT_AUDIO_EXTENSIONS};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{LibraryError, Result};
use crate::models::{catalog_pairs, AudioFile, Category, Grade};
use crate::parser::parse_unit_from_file_name;

/// Builds the full lesson catalog from an [`AssetStore`].
///
/// Each (grade, category) folder is listed independently. A folder that
/// cannot be listed counts as empty; only an unusable store fails the load.
pub struct CatalogLoader {
    store: Arc<dyn AssetStore>,
    audio_extensions: Vec<String>,
    events: Option<EventBus>,
}

impl CatalogLoader {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            audio_extensions: DEFAULT_AUDIO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            events: None,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(Arc::clone(&config.asset_store))
            .with_audio_extensions(config.audio_extensions.clone())
    }

    /// Replace the accepted extensions (lower-case, without dot).
    pub fn with_audio_extensions(mut self, extensions: Vec<String>) -> Self {
        self.audio_extensions = extensions;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Load every unit, ordered by grade, category, then unit number.
    ///
    /// Duplicate units resolve to the last file in listing order; listings
    /// are sorted by file name first so the outcome is stable.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<AudioFile>> {
        if let Err(err) = self.store.probe().await {
            error!(error = %err, "Asset store unavailable");
            self.emit(CatalogEvent::LoadFailed {
                message: err.to_string(),
            });
            return Err(LibraryError::CatalogUnavailable(err.to_string()));
        }

        let pairs: Vec<(Grade, Category)> = catalog_pairs().collect();
        let folders = join_all(
            pairs
                .iter()
                .map(|&(grade, category)| self.scan_folder(grade, category)),
        )
        .await;

        let mut units: BTreeMap<(Grade, Category, u32), AudioFile> = BTreeMap::new();
        for file in folders.into_iter().flatten() {
            if let Some(previous) = units.insert(file.key(), file) {
                debug!(
                    file = %previous.file_name,
                    unit = %previous.id,
                    "Duplicate unit replaced by a later file"
                );
            }
        }

        let catalog: Vec<AudioFile> = units.into_values().collect();
        let grade_count = crate::query::grades_in(&catalog).len();

        info!(units = catalog.len(), grades = grade_count, "Catalog loaded");
        self.emit(CatalogEvent::Loaded {
            total_units: catalog.len(),
            grade_count,
        });

        Ok(catalog)
    }

    async fn scan_folder(&self, grade: Grade, category: Category) -> Vec<AudioFile> {
        let folder = grade.folder_for(category);

        let mut names = match self.store.list(&folder).await {
            Ok(names) => names,
            Err(err) => {
                warn!(folder = %folder, error = %err, "Skipping unreadable catalog folder");
                self.emit(CatalogEvent::FolderSkipped {
                    folder,
                    reason: err.to_string(),
                });
                return Vec::new();
            }
        };
        names.sort();

        let files: Vec<AudioFile> = names
            .into_iter()
            .filter(|name| has_audio_extension(name, &self.audio_extensions))
            .filter_map(|name| match parse_unit_from_file_name(&name) {
                Some(unit) => Some(AudioFile::new(
                    grade,
                    category,
                    unit.number,
                    unit.label,
                    name,
                )),
                None => {
                    debug!(folder = %folder, file = %name, "No unit marker, skipping file");
                    None
                }
            })
            .collect();

        debug!(folder = %folder, count = files.len(), "Scanned catalog folder");
        files
    }

    fn emit(&self, event: CatalogEvent) {
        if let Some(bus) = &self.events {
            bus.emit(CoreEvent::Catalog(event)).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{AssetDescriptor, BridgeError};
    use std::collections::HashMap;

    #[derive(Default)]
    struct FolderMapStore {
        folders: HashMap<String, Vec<String>>,
    }

    impl FolderMapStore {
        fn with(mut self, folder: &str, files: &[&str]) -> Self {
            self.folders.insert(
                folder.to_string(),
                files.iter().map(|f| f.to_string()).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl AssetStore for FolderMapStore {
        async fn list(&self, folder: &str) -> BridgeResult<Vec<String>> {
            self.folders
                .get(folder)
                .cloned()
                .ok_or_else(|| BridgeError::NotFound(folder.to_string()))
        }

        async fn open(&self, path: &str) -> BridgeResult<AssetDescriptor> {
            Ok(AssetDescriptor::new(path, path))
        }
    }

    #[core_async::test]
    async fn test_filters_extension_and_unparseable_names() {
        let store = FolderMapStore::default().with(
            "一年级上册课本",
            &["unit 1.mp3", "unit 2.wav", "cover.jpg", "intro.mp3", "Unit 3.MP3"],
        );
        let loader = CatalogLoader::new(Arc::new(store));

        let catalog = loader.load().await.unwrap();
        let numbers: Vec<u32> = catalog.iter().map(|f| f.unit_number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[core_async::test]
    async fn test_custom_extensions() {
        let store = FolderMapStore::default().with("一年级上册课本", &["unit 1.mp3", "unit 2.m4a"]);
        let loader =
            CatalogLoader::new(Arc::new(store)).with_audio_extensions(vec!["m4a".to_string()]);

        let catalog = loader.load().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].file_name, "unit 2.m4a");
    }

    #[core_async::test]
    async fn test_duplicate_unit_last_listed_wins() {
        let store = FolderMapStore::default()
            .with("一年级上册课本", &["unit 1 (new).mp3", "unit 01 (old).mp3"]);
        let loader = CatalogLoader::new(Arc::new(store));

        let catalog = loader.load().await.unwrap();
        assert_eq!(catalog.len(), 1);
        // "unit 1 (new)" sorts after "unit 01 (old)"
        assert_eq!(catalog[0].file_name, "unit 1 (new).mp3");
    }

    #[core_async::test]
    async fn test_emits_skip_and_loaded_events() {
        let bus = EventBus::new(32);
        let mut rx = bus.subscribe();
        let store = FolderMapStore::default().with("二年级上册单词", &["unit 5.mp3"]);
        let loader = CatalogLoader::new(Arc::new(store)).with_event_bus(bus);

        loader.load().await.unwrap();

        let mut skipped = 0;
        let mut loaded = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                CoreEvent::Catalog(CatalogEvent::FolderSkipped { .. }) => skipped += 1,
                CoreEvent::Catalog(CatalogEvent::Loaded {
                    total_units,
                    grade_count,
                }) => loaded = Some((total_units, grade_count)),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(skipped, 11);
        assert_eq!(loaded, Some((1, 1)));
    }
}
