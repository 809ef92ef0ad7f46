//! # Playback Controller
//!
//! State machine around the single native player handle.
//!
//! ## Overview
//!
//! The controller holds at most one `ActiveSession`: the unit being played,
//! its native handle and the token of its refresh task. Every transition is
//! published on a `watch` channel as a [`PlaybackState`] and, when an event bus
//! is attached, as a [`PlaybackEvent`].
//!
//! Two background tasks touch the session besides the control operations:
//!
//! - the refresh task, which polls the handle every `refresh_interval` and
//!   republishes position and duration;
//! - the native event pump, which applies completion and error callbacks.
//!
//! Both lock the session and check that the session they were started for is
//! still current, so a released handle can never publish.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use bridge_traits::{
    AssetStore, NativeEventReceiver, NativePlayer, NativePlayerEvent, NativePlayerFactory,
    PlayerEventSink, PlayerSessionId,
};
use core_async::sync::{mpsc, watch, CancellationToken, Mutex};
use core_async::task::JoinHandle;
use core_catalog::AudioFile;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use tracing::{debug, error, info, instrument, warn};

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::refresh::spawn_repeating;
use crate::state::PlaybackState;

/// The unit currently loaded into the native player.
struct ActiveSession {
    id: PlayerSessionId,
    file: AudioFile,
    player: Box<dyn NativePlayer>,
    refresh: Option<CancellationToken>,
}

impl ActiveSession {
    fn cancel_refresh(&mut self) {
        if let Some(token) = self.refresh.take() {
            token.cancel();
        }
    }

    /// Cancel the refresh task and free the handle.
    fn close(mut self) {
        self.cancel_refresh();
        self.player.release();
        debug!(session = %self.id, unit = %self.file.id, "Released native player");
    }

    fn progress(&self) -> Result<(u64, u64)> {
        let position = self.player.position_ms()?;
        let duration = self.player.duration_ms()?;
        Ok((position, duration))
    }

    fn state(&self, playing: bool, position_ms: u64, duration_ms: u64) -> PlaybackState {
        let file = self.file.clone();
        if playing {
            PlaybackState::Playing {
                file,
                position_ms,
                duration_ms,
            }
        } else {
            PlaybackState::Paused {
                file,
                position_ms,
                duration_ms,
            }
        }
    }
}

struct Inner {
    factory: Arc<dyn NativePlayerFactory>,
    store: Arc<dyn AssetStore>,
    config: PlaybackConfig,
    events: Option<EventBus>,
    native_tx: mpsc::UnboundedSender<(PlayerSessionId, NativePlayerEvent)>,
    state_tx: watch::Sender<PlaybackState>,
    session: Mutex<Option<ActiveSession>>,
}

/// Drives one native player handle through Idle, Playing, Paused and Error.
///
/// Control operations never fail from the caller's point of view; failures
/// become [`PlaybackState::Error`]. Dropping the controller releases the
/// handle.
pub struct PlaybackController {
    inner: Arc<Inner>,
    pump: JoinHandle<()>,
}

impl PlaybackController {
    /// Create a controller. Must be called from within a runtime, which runs
    /// the native event pump.
    pub fn new(
        factory: Arc<dyn NativePlayerFactory>,
        store: Arc<dyn AssetStore>,
        config: PlaybackConfig,
        events: Option<EventBus>,
    ) -> Result<Self> {
        config.validate().map_err(PlaybackError::Internal)?;
        let runtime = core_async::runtime::current_handle().ok_or_else(|| {
            PlaybackError::Internal("playback controller requires an async runtime".to_string())
        })?;

        let (native_tx, native_rx) = bridge_traits::native_event_channel();
        let (state_tx, _) = watch::channel(PlaybackState::Idle);
        let inner = Arc::new(Inner {
            factory,
            store,
            config,
            events,
            native_tx,
            state_tx,
            session: Mutex::new(None),
        });

        let pump = runtime.spawn(run_event_pump(Arc::downgrade(&inner), native_rx));
        Ok(Self { inner, pump })
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PlaybackState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver that sees every published state, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state_tx.subscribe()
    }

    /// Unit loaded into the native player.
    pub async fn now_playing(&self) -> Result<AudioFile> {
        self.inner
            .session
            .lock()
            .await
            .as_ref()
            .map(|session| session.file.clone())
            .ok_or(PlaybackError::NoTrackLoaded)
    }

    /// Start `file` from the beginning, replacing whatever was loaded.
    #[instrument(skip(self, file), fields(unit = %file.id))]
    pub async fn play(&self, file: AudioFile) {
        let inner = &self.inner;
        let mut slot = inner.session.lock().await;
        if let Some(previous) = slot.take() {
            previous.close();
        }

        match inner.open_session(file.clone()).await {
            Ok(mut session) => {
                let duration_ms = session.file.duration_ms.unwrap_or(0);
                info!(
                    session = %session.id,
                    duration_ms,
                    "Playing {}",
                    session.file.full_display_name()
                );
                inner.publish(session.state(true, 0, duration_ms));
                inner.emit(PlaybackEvent::Started {
                    unit_id: session.file.id.to_string(),
                    title: session.file.full_display_name(),
                    duration_ms,
                });
                inner.start_refresh(&mut session);
                *slot = Some(session);
            }
            Err(err) => {
                error!(error = %err, "Failed to start playback");
                inner.fail(Some(&file), format!("Playback failed: {err}"));
            }
        }
    }

    /// Playing → Paused. Does nothing unless the handle is playing.
    #[instrument(skip(self))]
    pub async fn pause(&self) {
        let inner = &self.inner;
        let mut slot = inner.session.lock().await;
        let Some(session) = slot.as_mut() else {
            return;
        };
        if !session.player.is_playing() {
            return;
        }

        let result = session
            .player
            .pause()
            .map_err(PlaybackError::from)
            .and_then(|()| session.progress());
        match result {
            Ok((position_ms, duration_ms)) => {
                debug!(position_ms, "Paused");
                inner.publish(session.state(false, position_ms, duration_ms));
                inner.emit(PlaybackEvent::Paused {
                    unit_id: session.file.id.to_string(),
                    position_ms,
                });
            }
            Err(err) => {
                error!(error = %err, "Failed to pause playback");
                inner.abort(&mut slot, format!("Pause failed: {err}"));
            }
        }
    }

    /// Paused → Playing. Does nothing when already playing or nothing is loaded.
    #[instrument(skip(self))]
    pub async fn resume(&self) {
        let inner = &self.inner;
        let mut slot = inner.session.lock().await;
        let Some(session) = slot.as_mut() else {
            return;
        };
        if session.player.is_playing() {
            return;
        }

        let result = session
            .player
            .start()
            .map_err(PlaybackError::from)
            .and_then(|()| session.progress());
        match result {
            Ok((position_ms, duration_ms)) => {
                debug!(position_ms, "Resumed");
                inner.publish(session.state(true, position_ms, duration_ms));
                inner.emit(PlaybackEvent::Resumed {
                    unit_id: session.file.id.to_string(),
                    position_ms,
                });
                inner.start_refresh(session);
            }
            Err(err) => {
                error!(error = %err, "Failed to resume playback");
                inner.abort(&mut slot, format!("Resume failed: {err}"));
            }
        }
    }

    /// Pause when playing, resume when paused, otherwise nothing.
    pub async fn toggle_play_pause(&self) {
        match self.state() {
            PlaybackState::Playing { .. } => self.pause().await,
            PlaybackState::Paused { .. } => self.resume().await,
            PlaybackState::Idle | PlaybackState::Error { .. } => {}
        }
    }

    /// Any state → Idle, releasing the handle.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let inner = &self.inner;
        let mut slot = inner.session.lock().await;
        let unit_id = match slot.take() {
            Some(mut session) => {
                session.cancel_refresh();
                if let Err(err) = session.player.stop() {
                    warn!(error = %err, "Native stop failed, releasing anyway");
                }
                let unit_id = session.file.id.to_string();
                session.close();
                Some(unit_id)
            }
            None => None,
        };

        info!("Playback stopped");
        inner.publish(PlaybackState::Idle);
        inner.emit(PlaybackEvent::Stopped { unit_id });
    }

    /// Move the position. Keeps Playing or Paused; no-op when nothing is loaded.
    #[instrument(skip(self))]
    pub async fn seek_to(&self, position_ms: u64) {
        let inner = &self.inner;
        let mut slot = inner.session.lock().await;
        let Some(session) = slot.as_mut() else {
            return;
        };

        let result = session
            .player
            .seek_to(position_ms)
            .map_err(PlaybackError::from)
            .and_then(|()| session.progress());
        match result {
            Ok((position_ms, duration_ms)) => {
                let state = inner.state_tx.borrow().with_position(position_ms);
                if state.is_active() {
                    inner.publish(state);
                }
                inner.emit(PlaybackEvent::PositionChanged {
                    unit_id: session.file.id.to_string(),
                    position_ms,
                    duration_ms,
                });
            }
            Err(err) => {
                error!(error = %err, "Failed to seek");
                inner.abort(&mut slot, format!("Seek failed: {err}"));
            }
        }
    }

    /// Free the handle. Playing and Paused become Idle; Idle and Error stay.
    #[instrument(skip(self))]
    pub async fn release(&self) {
        let inner = &self.inner;
        let mut slot = inner.session.lock().await;
        let Some(session) = slot.take() else {
            return;
        };
        let unit_id = session.file.id.to_string();
        session.close();

        if inner.state_tx.borrow().is_active() {
            inner.publish(PlaybackState::Idle);
        }
        inner.emit(PlaybackEvent::Stopped {
            unit_id: Some(unit_id),
        });
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl Inner {
    async fn open_session(&self, file: AudioFile) -> Result<ActiveSession> {
        let asset = self
            .store
            .open(&file.file_path)
            .await
            .map_err(|err| PlaybackError::SourceError(err.to_string()))?;

        let id = PlayerSessionId::new();
        let sink = PlayerEventSink::new(id, self.native_tx.clone());
        let mut player = self.factory.create(&asset, sink)?;

        let duration = match prepare_and_start(player.as_mut()) {
            Ok(duration) => duration,
            Err(err) => {
                player.release();
                return Err(err);
            }
        };

        let file = if duration > 0 {
            file.with_duration(duration)
        } else {
            file
        };
        Ok(ActiveSession {
            id,
            file,
            player,
            refresh: None,
        })
    }

    /// Replace the session's refresh task with a fresh one.
    fn start_refresh(self: &Arc<Self>, session: &mut ActiveSession) {
        session.cancel_refresh();

        let token = CancellationToken::new();
        let weak = Arc::downgrade(self);
        let id = session.id;
        let tick_token = token.clone();
        spawn_repeating(self.config.refresh_interval, token.clone(), move || {
            let weak = weak.clone();
            let token = tick_token.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.refresh_tick(id, &token).await,
                    None => ControlFlow::Break(()),
                }
            }
        });
        session.refresh = Some(token);
    }

    async fn refresh_tick(&self, id: PlayerSessionId, token: &CancellationToken) -> ControlFlow<()> {
        let mut slot = self.session.lock().await;
        // Superseded while waiting for the lock
        if token.is_cancelled() {
            return ControlFlow::Break(());
        }
        let Some(session) = slot.as_mut().filter(|session| session.id == id) else {
            return ControlFlow::Break(());
        };

        match session.progress() {
            Ok((position_ms, duration_ms)) => {
                let playing = session.player.is_playing();
                let changed = self.publish(session.state(playing, position_ms, duration_ms));
                if changed && playing {
                    self.emit(PlaybackEvent::PositionChanged {
                        unit_id: session.file.id.to_string(),
                        position_ms,
                        duration_ms,
                    });
                }
                ControlFlow::Continue(())
            }
            Err(err) => {
                error!(error = %err, "Failed to read native player state");
                self.abort(&mut slot, format!("State update failed: {err}"));
                ControlFlow::Break(())
            }
        }
    }

    async fn on_native_event(&self, id: PlayerSessionId, event: NativePlayerEvent) {
        let mut slot = self.session.lock().await;
        if slot.as_ref().map(|session| session.id) != Some(id) {
            debug!(session = %id, ?event, "Ignoring event from released player");
            return;
        }

        match event {
            NativePlayerEvent::Completed => {
                if let Some(session) = slot.take() {
                    let unit_id = session.file.id.to_string();
                    session.close();
                    info!(unit = %unit_id, "Playback completed");
                    self.publish(PlaybackState::Idle);
                    self.emit(PlaybackEvent::Completed { unit_id });
                }
            }
            NativePlayerEvent::Error { what, extra } => {
                error!(what, extra, "Native player error");
                self.abort(&mut slot, format!("Playback error: what={what}, extra={extra}"));
            }
        }
    }

    /// Tear down the current session and enter the error state.
    fn abort(&self, slot: &mut Option<ActiveSession>, message: String) {
        let file = slot.take().map(|session| {
            let file = session.file.clone();
            session.close();
            file
        });
        self.fail(file.as_ref(), message);
    }

    fn fail(&self, file: Option<&AudioFile>, message: String) {
        self.publish(PlaybackState::Error {
            message: message.clone(),
        });
        self.emit(PlaybackEvent::Error {
            unit_id: file.map(|file| file.id.to_string()),
            message,
        });
    }

    /// Publish `state` when it differs from the current one.
    fn publish(&self, state: PlaybackState) -> bool {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        })
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            bus.emit(CoreEvent::Playback(event)).ok();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.close();
        }
    }
}

/// Prepare and start a fresh handle, returning its duration.
fn prepare_and_start(player: &mut dyn NativePlayer) -> Result<u64> {
    player.prepare()?;
    player.start()?;
    player.duration_ms().map_err(PlaybackError::from)
}

async fn run_event_pump(inner: Weak<Inner>, mut events: NativeEventReceiver) {
    while let Some((id, event)) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.on_native_event(id, event).await;
    }
}
