//! Playback engine - core orchestration
//!
//! Owns the single active audio handle and drives it against the playback
//! store: loading and crossfading tracks, sampling progress, walking the
//! queue under repeat/shuffle rules and reacting to track ends.
//!
//! The engine is synchronous. Handle lifecycle events arrive through
//! [`PlaybackEngine::on_handle_event`] and progress frames through
//! [`PlaybackEngine::tick`]; the player service feeds both from a single
//! task. Every event is checked against the handle the engine currently owns,
//! so late callbacks from superseded handles have no effect.

use crate::{
    config::PlaybackConfig,
    crossfade::Crossfade,
    error::{PlaybackError, Result},
    events::PlayerEvent,
    handle::{
        AudioBackend, AudioHandle, HandleEvent, HandleEvents, HandleId, HandleMessage, LoadOptions,
    },
    progress::{whole_seconds, ProgressSampler},
    queue::Queue,
    state::{PlaybackState, PlaybackStore},
    types::RepeatMode,
};
use lull_core::{LullError, PlaylistId, PlaylistStore, Track, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// User-facing error channel, called with "Unable to play track: {title}"
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// The handle the engine issues commands to
struct ActiveHandle {
    id: HandleId,
    handle: Box<dyn AudioHandle>,
    track: Track,
    loaded: bool,

    /// Whether audio should start once loaded; cleared by pause/stop
    start_on_load: bool,

    /// Queue position to commit once loaded
    queue_index: Option<usize>,

    /// Seek requested before loading, applied once the duration is known
    pending_seek: Option<f64>,
}

/// Direction of a queue step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    Previous,
}

/// Outcome of resolving a queue step
enum Resolution {
    /// The step lands on the track already playing
    Restart,

    /// Load another track and commit `index` once it has loaded
    Play { track: Track, index: usize },

    /// No queue, or the queued id no longer exists
    Unresolved,
}

/// Central playback orchestration
pub struct PlaybackEngine {
    config: PlaybackConfig,
    store: PlaybackStore,
    library: Arc<dyn PlaylistStore>,
    backend: Box<dyn AudioBackend>,

    // Handle slots
    handle_events: UnboundedSender<HandleMessage>,
    next_handle_id: u64,
    active: Option<ActiveHandle>,
    crossfade: Crossfade,

    // Progress loop, replaced on every load
    sampler: Option<ProgressSampler>,

    rng: StdRng,
    on_error: ErrorCallback,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl PlaybackEngine {
    /// Create a new engine
    ///
    /// Every handle the engine creates reports its lifecycle events on
    /// `handle_events`; whoever owns the receiving end must pass them back
    /// through [`PlaybackEngine::on_handle_event`].
    pub fn new(
        config: PlaybackConfig,
        library: Arc<dyn PlaylistStore>,
        backend: Box<dyn AudioBackend>,
        handle_events: UnboundedSender<HandleMessage>,
        on_error: ErrorCallback,
    ) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store: PlaybackStore::new(PlaybackState::from_config(&config)),
            crossfade: Crossfade::new(config.crossfade()),
            config,
            library,
            backend,
            handle_events,
            next_handle_id: 0,
            active: None,
            sampler: None,
            rng,
            on_error,
            pending_events: Vec::new(),
        }
    }

    // ===== State Access =====

    /// Current playback snapshot
    pub fn snapshot(&self) -> &PlaybackState {
        self.store.snapshot()
    }

    /// Engine configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Id of the handle receiving playback commands
    pub fn active_handle(&self) -> Option<HandleId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Id of the handle fading out, if a crossfade is in progress
    pub fn outgoing_handle(&self) -> Option<HandleId> {
        self.crossfade.outgoing_id()
    }

    /// Whether the progress loop is scheduled
    pub fn is_sampling(&self) -> bool {
        self.sampler.is_some()
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Playback Control =====

    /// Play a track, replacing the current one
    ///
    /// The new handle starts silent and fades in once loaded while the
    /// previous handle fades out. Load failures are reported through the
    /// error callback, never returned.
    pub fn play(&mut self, track: Track) {
        self.start(track, None);
    }

    /// Build the queue from a playlist and play one of its tracks
    ///
    /// # Errors
    /// Fails if the playlist or track is unknown, or the track is not part
    /// of the playlist
    pub fn play_from_playlist(
        &mut self,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<()> {
        let playlist = self
            .library
            .playlist(playlist_id)
            .ok_or_else(|| LullError::PlaylistNotFound(playlist_id.clone()))?;
        let index = playlist
            .position(track_id)
            .ok_or_else(|| LullError::TrackNotFound(track_id.clone()))?;
        let track = self
            .library
            .track(track_id)
            .ok_or_else(|| LullError::TrackNotFound(track_id.clone()))?;

        let mut queue = Queue::new(playlist.tracks, index)?;
        if self.store.snapshot().shuffle {
            queue.reshuffle(&mut self.rng);
        }
        info!(playlist = %playlist_id, index, "queue built from playlist");
        self.store.set_queue(Some(queue));
        self.pending_events.push(PlayerEvent::QueueIndexChanged { index });

        self.play(track);
        Ok(())
    }

    /// Seek to a position in seconds
    ///
    /// With no handle the store records the position as given. While the
    /// incoming track is still loading the position is held back and
    /// applied to both store and handle once it has loaded. NaN is ignored.
    pub fn seek(&mut self, seconds: f64) {
        if seconds.is_nan() {
            debug!("ignoring seek to non-numeric position");
            return;
        }
        if let Some(active) = self.active.as_mut().filter(|a| !a.loaded) {
            debug!(handle = %active.id, seconds, "deferring seek until loaded");
            active.pending_seek = Some(seconds.max(0.0));
            return;
        }
        self.store.set_progress(seconds);
        let position = self.store.snapshot().progress;
        if let Some(active) = self.active.as_mut() {
            active.handle.seek(position);
        }
        self.pending_events.push(PlayerEvent::PositionUpdate {
            position_secs: position,
        });
    }

    /// Stop playback and rewind, keeping the track loaded
    pub fn stop(&mut self) {
        info!("stopping playback");
        self.commit_playing(false);
        self.store.set_progress(0.0);
        self.crossfade.discard();
        if let Some(active) = self.active.as_mut() {
            active.start_on_load = false;
            active.pending_seek = None;
            active.handle.stop();
        }
        self.pending_events.push(PlayerEvent::PositionUpdate { position_secs: 0.0 });
    }

    /// Play or pause
    ///
    /// Pausing also drops a track still fading out.
    pub fn set_playing(&mut self, playing: bool) {
        info!(playing, "transport changed");
        self.commit_playing(playing);
        if !playing {
            self.crossfade.discard();
        }
        if let Some(active) = self.active.as_mut() {
            if !active.loaded {
                active.start_on_load = playing;
            }
        }
        self.sync_transport();
    }

    /// Skip forward according to the repeat mode
    pub fn next(&mut self) {
        self.navigate(Step::Next);
    }

    /// Skip back according to the repeat mode
    ///
    /// In playlist mode, pressing previous more than
    /// `previous_restart_secs` into a track restarts it instead.
    pub fn previous(&mut self) {
        self.navigate(Step::Previous);
    }

    // ===== Settings =====

    /// Set volume (0.0-1.0); NaN is ignored
    pub fn set_volume(&mut self, volume: f32) {
        if !self.store.set_volume(volume) {
            debug!("ignoring non-numeric volume");
            return;
        }
        let level = self.store.snapshot().volume;
        if let Some(active) = self.active.as_mut() {
            active.handle.set_volume(level);
        }
        self.emit_volume_changed();
    }

    /// Mute or unmute
    pub fn set_muted(&mut self, muted: bool) {
        self.store.set_muted(muted);
        if let Some(active) = self.active.as_mut() {
            active.handle.set_muted(muted);
        }
        self.emit_volume_changed();
    }

    /// Set repeat mode
    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        debug!(%repeat, "repeat mode changed");
        self.store.set_repeat(repeat);
    }

    /// Turn shuffle on or off; turning it on draws a new order
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.store.set_shuffle(shuffle);
        if shuffle {
            if let Some(queue) = self.store.queue_mut() {
                queue.reshuffle(&mut self.rng);
                debug!(order = ?queue.shuffled(), "queue reshuffled");
            }
        }
    }

    /// Install a queue directly
    pub fn set_queue(&mut self, queue: Option<Queue>) {
        self.store.set_queue(queue);
    }

    /// Re-derive the queue after the underlying track list changed
    ///
    /// An empty list removes the queue.
    pub fn refresh_queue(&mut self, tracks: Vec<TrackId>) -> Result<()> {
        if tracks.is_empty() {
            self.store.set_queue(None);
            return Ok(());
        }
        let playing = self.store.snapshot().track.as_ref().map(|t| t.id.clone());
        let shuffle = self.store.snapshot().shuffle;
        match self.store.queue_mut() {
            Some(queue) => queue.replace_tracks(tracks, playing.as_ref())?,
            None => {
                let current = playing
                    .as_ref()
                    .and_then(|id| tracks.iter().position(|t| t == id))
                    .unwrap_or(0);
                self.store.set_queue(Some(Queue::new(tracks, current)?));
            }
        }
        if shuffle {
            if let Some(queue) = self.store.queue_mut() {
                queue.reshuffle(&mut self.rng);
            }
        }
        Ok(())
    }

    /// Release every handle and forget the track and queue
    pub fn reset(&mut self) {
        self.release_handles();
        self.store.clear();
        self.pending_events.push(PlayerEvent::StateChanged { playing: false });
    }

    // ===== Handle Events =====

    /// Apply a lifecycle event reported by a handle
    ///
    /// Events from handles the engine no longer owns are dropped.
    pub fn on_handle_event(&mut self, id: HandleId, event: HandleEvent) {
        match event {
            HandleEvent::Loaded if self.is_active(id) => self.on_loaded(),
            HandleEvent::LoadError(reason) | HandleEvent::PlayError(reason)
                if self.is_active(id) =>
            {
                warn!(handle = %id, %reason, "handle failed");
                if let Some(track) = self.active.as_ref().map(|a| a.track.clone()) {
                    self.fail(&track);
                }
            }
            HandleEvent::Faded => {
                if self.crossfade.finish(id) {
                    self.pending_events
                        .push(PlayerEvent::CrossfadeCompleted { handle: id });
                } else {
                    debug!(handle = %id, "ignoring fade completion");
                }
            }
            HandleEvent::Ended if self.is_active_loaded(id) => self.on_track_end(),
            other => {
                debug!(handle = %id, event = ?other, "ignoring event from superseded handle");
            }
        }
    }

    /// One frame of the progress loop
    pub fn tick(&mut self, now: Instant) {
        let (Some(sampler), Some(active)) = (self.sampler.as_mut(), self.active.as_ref()) else {
            return;
        };
        if !active.loaded {
            return;
        }
        if let Some(seconds) = sampler.sample(active.handle.as_ref(), now) {
            self.store.set_progress(f64::from(seconds));
            self.pending_events.push(PlayerEvent::PositionUpdate {
                position_secs: self.store.snapshot().progress,
            });
        }
    }

    // ===== Internals =====

    fn is_active(&self, id: HandleId) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == id)
    }

    fn is_active_loaded(&self, id: HandleId) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == id && a.loaded)
    }

    fn allocate_handle_id(&mut self) -> HandleId {
        self.next_handle_id += 1;
        HandleId::new(self.next_handle_id)
    }

    /// Swap in a new handle for `track`
    fn start(&mut self, track: Track, queue_index: Option<usize>) {
        info!(track = %track.id, title = %track.title, "loading track");
        self.sampler = None;

        if let Some(mut previous) = self.active.take() {
            if previous.loaded {
                self.crossfade
                    .hold(previous.id, previous.handle, Some(previous.track.id));
            } else {
                debug!(handle = %previous.id, "superseded before loading");
                previous.handle.unload();
            }
        }

        let id = self.allocate_handle_id();
        let events = HandleEvents::new(id, self.handle_events.clone());
        let options = LoadOptions {
            stream: self.config.stream,
            volume: 0.0,
            muted: self.store.snapshot().muted,
        };

        let mut handle = match self.backend.create(events) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(track = %track.id, %err, "could not create audio handle");
                self.fail(&track);
                return;
            }
        };
        if let Err(err) = handle.load(&track.url, options) {
            warn!(track = %track.id, %err, "could not start loading");
            handle.unload();
            self.fail(&track);
            return;
        }
        if !handle.has_resource() {
            warn!(track = %track.id, "handle has no playable resource");
            handle.unload();
            self.fail(&track);
            return;
        }

        self.active = Some(ActiveHandle {
            id,
            handle,
            track,
            loaded: false,
            start_on_load: true,
            queue_index,
            pending_seek: None,
        });
    }

    /// Commit the active track once its handle reports `Loaded`
    fn on_loaded(&mut self) {
        let volume = self.store.snapshot().volume;
        let fade = self.crossfade.duration();

        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.loaded {
            return;
        }
        active.loaded = true;

        // Streams report no duration or an infinite one; leave it unknown
        let duration = active
            .handle
            .duration()
            .filter(|seconds| seconds.is_finite())
            .map(whole_seconds);
        if let Some(seconds) = duration {
            active.track = active.track.with_duration(seconds);
        }
        if fade.is_zero() {
            active.handle.set_volume(volume);
        } else {
            active.handle.fade(0.0, volume, fade);
        }

        let track = active.track.clone();
        let start = active.start_on_load;
        let queue_index = active.queue_index.take();
        let pending_seek = active.pending_seek.take();

        let previous_track_id = self.store.snapshot().track.as_ref().map(|t| t.id.clone());
        self.store.set_track(track.clone());
        info!(track = %track.id, duration = ?track.duration, "track loaded");
        self.pending_events.push(PlayerEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
            duration_secs: track.duration,
        });

        if let Some(seconds) = pending_seek {
            self.seek(seconds);
        }

        if let Some(index) = queue_index {
            if self.store.set_queue_index(index) {
                self.pending_events
                    .push(PlayerEvent::QueueIndexChanged { index });
            }
        }

        if let Some(from_track_id) = self.crossfade.begin(volume) {
            self.pending_events.push(PlayerEvent::CrossfadeStarted {
                from_track_id,
                to_track_id: track.id,
                duration_ms: self.config.crossfade_ms,
            });
        }

        self.sampler = Some(ProgressSampler::start(
            self.config.progress_interval(),
            Instant::now(),
        ));

        self.commit_playing(start);
        self.sync_transport();
    }

    /// Recover from a track that cannot be played
    fn fail(&mut self, track: &Track) {
        if let Some(mut active) = self.active.take() {
            active.handle.unload();
        }
        self.sampler = None;
        self.crossfade.discard();

        self.commit_playing(false);
        self.store.stop_track();

        let message = PlaybackError::UnableToPlay(track.title.clone()).to_string();
        warn!(track = %track.id, "{message}");
        (self.on_error)(&message);
        self.pending_events.push(PlayerEvent::Error { message });
    }

    fn navigate(&mut self, step: Step) {
        if !self.store.snapshot().has_playback() {
            debug!(?step, "nothing loaded; ignoring");
            return;
        }

        match self.store.snapshot().repeat {
            RepeatMode::Off => self.stop(),
            RepeatMode::Track => self.seek(0.0),
            RepeatMode::Playlist => match self.resolve(step) {
                Resolution::Restart => self.seek(0.0),
                Resolution::Play { track, index } => self.start(track, Some(index)),
                Resolution::Unresolved => {}
            },
        }
    }

    /// Work out where a queue step lands
    ///
    /// Steps are taken from the position of a track still loading, so quick
    /// repeated presses keep advancing.
    fn resolve(&self, step: Step) -> Resolution {
        let state = self.store.snapshot();
        let Some(queue) = state.queue.as_ref() else {
            return Resolution::Unresolved;
        };

        let pending = self
            .active
            .as_ref()
            .filter(|a| !a.loaded)
            .and_then(|a| a.queue_index);
        let position = pending.unwrap_or_else(|| queue.current());

        let index = match step {
            Step::Next => queue.index_after(position),
            Step::Previous => {
                let step_back = state.progress < f64::from(self.config.previous_restart_secs);
                queue.index_before(position, step_back)
            }
        };

        let Some(id) = queue.resolve(index, state.shuffle) else {
            return Resolution::Unresolved;
        };

        let current_id = self
            .active
            .as_ref()
            .map(|a| &a.track.id)
            .or_else(|| state.track.as_ref().map(|t| &t.id));
        if current_id == Some(id) {
            return Resolution::Restart;
        }

        match self.library.track(id) {
            Some(track) => Resolution::Play { track, index },
            None => {
                warn!(track = %id, index, "queued track no longer exists; skipping");
                Resolution::Unresolved
            }
        }
    }

    fn on_track_end(&mut self) {
        let repeat = self.store.snapshot().repeat;
        debug!(%repeat, "track ended");

        match repeat {
            RepeatMode::Track => self.restart(),
            RepeatMode::Playlist => match self.resolve(Step::Next) {
                Resolution::Restart => self.restart(),
                Resolution::Play { track, index } => self.start(track, Some(index)),
                Resolution::Unresolved => self.finish_track(),
            },
            RepeatMode::Off => self.finish_track(),
        }
    }

    /// Seek to zero and resume
    fn restart(&mut self) {
        self.seek(0.0);
        self.commit_playing(true);
        self.sync_transport();
    }

    /// Leave the track stopped at its end
    fn finish_track(&mut self) {
        self.commit_playing(false);
        if let Some(duration) = self.store.snapshot().duration() {
            self.store.set_progress(f64::from(duration));
        }
    }

    /// Mirror the store's transport flag onto the active handle
    fn sync_transport(&mut self) {
        let playing = self.store.snapshot().playing;
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.loaded {
            return;
        }
        match (playing, active.handle.is_playing()) {
            (true, false) => active.handle.play(),
            (false, true) => active.handle.pause(),
            _ => {}
        }
    }

    fn commit_playing(&mut self, playing: bool) {
        if self.store.snapshot().playing != playing {
            self.store.set_playing(playing);
            self.pending_events
                .push(PlayerEvent::StateChanged { playing });
        }
    }

    fn emit_volume_changed(&mut self) {
        let state = self.store.snapshot();
        self.pending_events.push(PlayerEvent::VolumeChanged {
            volume: state.volume,
            muted: state.muted,
        });
    }

    fn release_handles(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.handle.unload();
        }
        self.crossfade.discard();
        self.sampler = None;
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.release_handles();
    }
}
