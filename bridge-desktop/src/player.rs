//! Headless native player for desktop hosts and tests.
//!
//! No audio is produced. The asset is probed with symphonia to learn its
//! duration, the position advances with a [`Clock`], and a timer reports
//! completion when the position reaches the end.

use bridge_traits::{
    assets::AssetDescriptor,
    error::{BridgeError, Result},
    playback::{NativePlayer, NativePlayerFactory, PlayerEventSink},
    time::{Clock, SystemClock},
};
use core_async::sync::CancellationToken;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Creates [`HeadlessPlayer`]s.
pub struct HeadlessPlayerFactory {
    clock: Arc<dyn Clock>,
}

impl HeadlessPlayerFactory {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Drive playback positions from `clock` instead of wall time.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for HeadlessPlayerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl NativePlayerFactory for HeadlessPlayerFactory {
    fn create(
        &self,
        asset: &AssetDescriptor,
        events: PlayerEventSink,
    ) -> Result<Box<dyn NativePlayer>> {
        debug!(asset = %asset.path, session = %events.session(), "Creating headless player");
        Ok(Box::new(HeadlessPlayer::new(
            asset.clone(),
            events,
            Arc::clone(&self.clock),
        )))
    }
}

/// Simulated player over a probed asset.
pub struct HeadlessPlayer {
    asset: AssetDescriptor,
    events: PlayerEventSink,
    clock: Arc<dyn Clock>,
    /// Set by `prepare`, cleared by `stop`
    duration_ms: Option<u64>,
    /// Position when playback last started or paused
    base_position_ms: u64,
    /// Clock reading at the last start while playing
    started_at_ms: Option<i64>,
    completion: Option<CancellationToken>,
    released: bool,
}

impl HeadlessPlayer {
    pub fn new(asset: AssetDescriptor, events: PlayerEventSink, clock: Arc<dyn Clock>) -> Self {
        Self {
            asset,
            events,
            clock,
            duration_ms: None,
            base_position_ms: 0,
            started_at_ms: None,
            completion: None,
            released: false,
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            return Err(BridgeError::OperationFailed(
                "player already released".to_string(),
            ));
        }
        Ok(())
    }

    fn prepared_duration(&self) -> Result<u64> {
        self.ensure_live()?;
        self.duration_ms.ok_or_else(|| {
            BridgeError::OperationFailed("player is not prepared".to_string())
        })
    }

    fn current_position(&self) -> u64 {
        let elapsed = self
            .started_at_ms
            .map(|started| (self.clock.unix_timestamp_millis() - started).max(0) as u64)
            .unwrap_or(0);
        let position = self.base_position_ms.saturating_add(elapsed);
        match self.duration_ms {
            Some(duration) if duration > 0 => position.min(duration),
            _ => position,
        }
    }

    fn freeze(&mut self) {
        self.base_position_ms = self.current_position();
        self.started_at_ms = None;
        self.cancel_completion();
    }

    fn cancel_completion(&mut self) {
        if let Some(token) = self.completion.take() {
            token.cancel();
        }
    }

    /// Fire `completed` once the remaining duration has elapsed.
    fn schedule_completion(&mut self) {
        self.cancel_completion();

        let duration = self.duration_ms.unwrap_or(0);
        if duration == 0 {
            debug!(asset = %self.asset.path, "Duration unknown, completion not scheduled");
            return;
        }
        let Some(runtime) = core_async::runtime::current_handle() else {
            debug!("No runtime, completion not scheduled");
            return;
        };

        let remaining = Duration::from_millis(duration.saturating_sub(self.current_position()));
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.events.clone();
        runtime.spawn(async move {
            core_async::select! {
                _ = cancelled.cancelled() => {}
                _ = core_async::sleep(remaining) => {
                    events.completed();
                }
            }
        });
        self.completion = Some(token);
    }
}

impl NativePlayer for HeadlessPlayer {
    fn prepare(&mut self) -> Result<()> {
        self.ensure_live()?;
        let duration = probe_duration_ms(&self.asset)?;
        debug!(asset = %self.asset.path, duration_ms = duration, "Prepared");
        self.duration_ms = Some(duration);
        self.base_position_ms = 0;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.prepared_duration()?;
        if self.started_at_ms.is_some() {
            return Ok(());
        }
        self.started_at_ms = Some(self.clock.unix_timestamp_millis());
        self.schedule_completion();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.prepared_duration()?;
        self.freeze();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.freeze();
        self.base_position_ms = 0;
        self.duration_ms = None;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        let duration = self.prepared_duration()?;
        let playing = self.started_at_ms.is_some();
        self.freeze();
        self.base_position_ms = if duration > 0 {
            position_ms.min(duration)
        } else {
            position_ms
        };
        if playing {
            self.started_at_ms = Some(self.clock.unix_timestamp_millis());
            self.schedule_completion();
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        !self.released && self.started_at_ms.is_some()
    }

    fn position_ms(&self) -> Result<u64> {
        self.ensure_live()?;
        Ok(self.current_position())
    }

    fn duration_ms(&self) -> Result<u64> {
        self.ensure_live()?;
        Ok(self.duration_ms.unwrap_or(0))
    }

    fn release(&mut self) {
        self.cancel_completion();
        self.started_at_ms = None;
        self.released = true;
    }
}

impl Drop for HeadlessPlayer {
    fn drop(&mut self) {
        self.cancel_completion();
    }
}

/// Probe the container and compute the duration of its first audio track.
///
/// Returns `0` when the container does not declare a frame count.
fn probe_duration_ms(asset: &AssetDescriptor) -> Result<u64> {
    let source = open_source(asset)?;
    let stream = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = Path::new(asset.file_name())
        .extension()
        .and_then(|ext| ext.to_str())
    {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| {
            warn!(asset = %asset.path, error = %err, "Format probe failed");
            BridgeError::OperationFailed(format!("cannot decode {}: {err}", asset.path))
        })?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            BridgeError::OperationFailed(format!("no audio track in {}", asset.path))
        })?;

    let params = &track.codec_params;
    let duration = match (params.n_frames, params.time_base, params.sample_rate) {
        (Some(frames), Some(time_base), _) => {
            let time = time_base.calc_time(frames);
            time.seconds * 1000 + (time.frac * 1000.0).round() as u64
        }
        (Some(frames), None, Some(rate)) if rate > 0 => frames * 1000 / u64::from(rate),
        _ => 0,
    };
    Ok(duration)
}

fn open_source(asset: &AssetDescriptor) -> Result<Box<dyn MediaSource>> {
    let mut file = File::open(&asset.location)?;
    match (asset.start_offset, asset.length) {
        (0, None) => Ok(Box::new(file)),
        (offset, length) => {
            file.seek(SeekFrom::Start(offset))?;
            let mut bytes = Vec::new();
            match length {
                Some(length) => file.take(length).read_to_end(&mut bytes)?,
                None => file.read_to_end(&mut bytes)?,
            };
            Ok(Box::new(Cursor::new(bytes)))
        }
    }
}
