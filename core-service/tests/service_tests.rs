use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_desktop::{FsAssetStore, HeadlessPlayerFactory};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{AssetDescriptor, AssetStore, BridgeError, ManualClock};
use core_catalog::LibraryError;
use core_runtime::events::{CatalogEvent, PlaybackEvent};
use core_service::{
    bootstrap, Category, CoreConfig, CoreError, CoreEvent, CoreService, Grade, PlaybackState,
    UnitListState,
};
use mockall::mock;

// ============================================================================
// Fixtures
// ============================================================================

/// 16-bit mono PCM WAV of `millis` at 8 kHz.
fn wav_bytes(millis: u32) -> Vec<u8> {
    let sample_rate = 8_000u32;
    let data_len = sample_rate * millis / 1000 * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);
    bytes
}

struct LessonTree(PathBuf);

impl LessonTree {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("lesson-tree-{}", uuid::Uuid::new_v4()));
        let tree = Self(root);
        tree.write("一年级上册课本/一上英课本unit 2.wav", &wav_bytes(800));
        tree.write("一年级上册课本/一上英课本unit 1.wav", &wav_bytes(500));
        tree.write("一年级上册课本/cover.jpg", b"jpeg");
        tree.write("一年级上册单词/【单词】一年级上册Unit 1.wav", &wav_bytes(300));
        tree.write("二年级上册课本/二上英课本project 3.wav", &wav_bytes(300));
        tree
    }

    fn write(&self, relative: &str, bytes: &[u8]) {
        let path = self.0.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    fn root(&self) -> &Path {
        &self.0
    }
}

impl Drop for LessonTree {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn service_over(root: &Path, clock: Arc<ManualClock>) -> CoreService {
    let config = CoreConfig::builder()
        .asset_store(Arc::new(FsAssetStore::new(root)))
        .player_factory(Arc::new(HeadlessPlayerFactory::with_clock(clock)))
        .audio_extensions(["wav"])
        .refresh_interval(Duration::from_millis(10))
        .build()
        .unwrap();
    CoreService::new(config).unwrap()
}

async fn wait_for(
    service: &CoreService,
    predicate: impl FnMut(&PlaybackState) -> bool,
) -> PlaybackState {
    let mut states = service.subscribe_playback();
    let state = tokio::time::timeout(Duration::from_secs(5), states.wait_for(predicate))
        .await
        .expect("state not reached in time")
        .expect("controller dropped")
        .clone();
    state
}

// ============================================================================
// Catalog through the façade
// ============================================================================

#[tokio::test]
async fn test_catalog_queries_over_directory() {
    let tree = LessonTree::new();
    let service = service_over(tree.root(), Arc::new(ManualClock::default()));

    assert_eq!(
        service.list_grades().await.unwrap(),
        vec![Grade::Grade1, Grade::Grade2]
    );
    assert_eq!(
        service.list_categories(Grade::Grade1).await.unwrap(),
        vec![Category::Textbook, Category::Vocabulary]
    );

    let units = service
        .list_units(Grade::Grade1, Category::Textbook)
        .await
        .unwrap();
    let labels: Vec<&str> = units.iter().map(|u| u.unit_name.as_str()).collect();
    assert_eq!(labels, vec!["Unit 1", "Unit 2"]);

    let project = service
        .find_unit(Grade::Grade2, Category::Textbook, 3)
        .await
        .unwrap()
        .unwrap();
    assert!(project.is_project());
    assert_eq!(project.file_path, "二年级上册课本/二上英课本project 3.wav");
}

#[tokio::test]
async fn test_units_view_states() {
    let tree = LessonTree::new();
    let service = service_over(tree.root(), Arc::new(ManualClock::default()));

    let ready = service
        .load_units_view(Grade::Grade1, Category::Vocabulary)
        .await;
    assert_eq!(ready.units().len(), 1);

    assert_eq!(
        service
            .load_units_view(Grade::Grade6, Category::Textbook)
            .await,
        UnitListState::Empty
    );

    let missing = service_over(&tree.root().join("absent"), Arc::new(ManualClock::default()));
    assert!(matches!(
        missing.load_units_view(Grade::Grade1, Category::Textbook).await,
        UnitListState::Failed(message) if message.starts_with("Catalog unavailable")
    ));
    assert!(matches!(
        missing.list_grades().await,
        Err(CoreError::Library(LibraryError::CatalogUnavailable(_)))
    ));
}

#[tokio::test]
async fn test_catalog_events_reach_subscribers() {
    let tree = LessonTree::new();
    let service = service_over(tree.root(), Arc::new(ManualClock::default()));
    let mut events = service
        .subscribe_events()
        .filter(|event| matches!(event, CoreEvent::Catalog(CatalogEvent::Loaded { .. })));

    service.load_catalog().await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        event,
        CoreEvent::Catalog(CatalogEvent::Loaded {
            total_units: 4,
            grade_count: 2
        })
    ));
}

mock! {
    Store {}

    #[async_trait]
    impl AssetStore for Store {
        async fn probe(&self) -> BridgeResult<()>;
        async fn list(&self, folder: &str) -> BridgeResult<Vec<String>>;
        async fn open(&self, path: &str) -> BridgeResult<AssetDescriptor>;
    }
}

#[tokio::test]
async fn test_unreadable_folders_give_empty_views() {
    let mut store = MockStore::new();
    store.expect_probe().returning(|| Ok(()));
    store
        .expect_list()
        .returning(|folder| Err(BridgeError::NotFound(folder.to_string())));

    let config = CoreConfig::builder()
        .asset_store(Arc::new(store))
        .player_factory(Arc::new(HeadlessPlayerFactory::new()))
        .build()
        .unwrap();
    let service = bootstrap(config).await.unwrap();

    assert!(service.list_grades().await.unwrap().is_empty());
    assert_eq!(
        service
            .load_units_view(Grade::Grade1, Category::Textbook)
            .await,
        UnitListState::Empty
    );
}

#[tokio::test]
async fn test_bootstrap_tolerates_failed_initial_load() {
    let config = CoreConfig::builder()
        .asset_store(Arc::new(FsAssetStore::new("/nonexistent/lesson/root")))
        .player_factory(Arc::new(HeadlessPlayerFactory::new()))
        .build()
        .unwrap();

    let service = bootstrap(config).await.unwrap();
    assert!(service.list_grades().await.is_err());
    assert_eq!(service.playback_state(), PlaybackState::Idle);
}

// ============================================================================
// Playback through the façade
// ============================================================================

#[tokio::test]
async fn test_play_unit_pause_and_stop() {
    let tree = LessonTree::new();
    let clock = Arc::new(ManualClock::default());
    let service = service_over(tree.root(), Arc::clone(&clock));

    service
        .play_unit(Grade::Grade1, Category::Textbook, 2)
        .await
        .unwrap();
    match service.playback_state() {
        PlaybackState::Playing {
            file, duration_ms, ..
        } => {
            assert_eq!(file.unit_number, 2);
            assert_eq!(duration_ms, 800);
        }
        other => panic!("expected Playing, got {other:?}"),
    }

    clock.advance_millis(200);
    let state = wait_for(&service, |s| s.position_ms() == 200).await;
    assert!(state.is_playing());
    assert_eq!(core_service::format_time(state.duration_ms()), "00:00");

    service.toggle_play_pause().await;
    assert!(matches!(
        service.playback_state(),
        PlaybackState::Paused {
            position_ms: 200,
            ..
        }
    ));

    service.seek_to(600).await;
    assert_eq!(service.playback_state().position_ms(), 600);

    service.stop().await;
    assert_eq!(service.playback_state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_play_unknown_unit_is_not_found() {
    let tree = LessonTree::new();
    let service = service_over(tree.root(), Arc::new(ManualClock::default()));

    let err = service
        .play_unit(Grade::Grade4, Category::Vocabulary, 7)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Library(LibraryError::NotFound { ref id, .. }) if id == "GRADE_4_VOCABULARY_7"
    ));
    assert_eq!(service.playback_state(), PlaybackState::Idle);
}

#[tokio::test]
async fn test_unit_plays_to_completion() {
    let tree = LessonTree::new();
    let service = service_over(tree.root(), Arc::new(ManualClock::default()));
    let mut events = service
        .subscribe_events()
        .filter(|event| matches!(event, CoreEvent::Playback(PlaybackEvent::Completed { .. })));

    service
        .play_unit(Grade::Grade1, Category::Vocabulary, 1)
        .await
        .unwrap();

    wait_for(&service, |s| *s == PlaybackState::Idle).await;
    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        event,
        CoreEvent::Playback(PlaybackEvent::Completed { unit_id }) if unit_id == "GRADE_1_VOCABULARY_1"
    ));
}

#[tokio::test]
async fn test_corrupt_asset_enters_error_state() {
    let tree = LessonTree::new();
    tree.write("三年级上册课本/三上英课本unit 1.wav", b"RIFF but not really");
    let service = service_over(tree.root(), Arc::new(ManualClock::default()));

    service
        .play_unit(Grade::Grade3, Category::Textbook, 1)
        .await
        .unwrap();

    let message = service
        .playback_state()
        .error_message()
        .map(str::to_string)
        .unwrap();
    assert!(message.starts_with("Playback failed: "), "{message}");

    service.play_unit(Grade::Grade1, Category::Textbook, 1).await.unwrap();
    assert!(service.playback_state().is_playing());

    service.release().await;
    assert_eq!(service.playback_state(), PlaybackState::Idle);
}
