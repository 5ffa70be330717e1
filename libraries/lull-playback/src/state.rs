//! Playback state store
//!
//! Pure state: every mutation is synchronous and leaves a consistent
//! snapshot behind. Translating state into audio commands is the engine's
//! job, never the store's.

use crate::config::PlaybackConfig;
use crate::queue::Queue;
use crate::types::RepeatMode;
use crate::volume::Volume;
use lull_core::Track;
use serde::{Deserialize, Serialize};

/// Snapshot of the player as observed by the UI and the media session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Loaded track, with its duration fixed
    pub track: Option<Track>,

    /// Transport flag
    pub playing: bool,

    /// Mute state
    pub muted: bool,

    /// Linear volume in 0.0..=1.0
    pub volume: f32,

    /// Seconds elapsed in the current track
    pub progress: f64,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Whether the queue is walked in shuffle order
    pub shuffle: bool,

    /// Playlist queue, present once something was played from a playlist
    pub queue: Option<Queue>,
}

impl PlaybackState {
    /// Initial state from configuration
    pub fn from_config(config: &PlaybackConfig) -> Self {
        let volume = Volume::new(config.volume, config.muted);
        Self {
            track: None,
            playing: false,
            muted: volume.is_muted(),
            volume: volume.level(),
            progress: 0.0,
            repeat: config.repeat,
            shuffle: config.shuffle,
            queue: None,
        }
    }

    /// Whether a track has been committed
    pub fn has_playback(&self) -> bool {
        self.track.is_some()
    }

    /// Duration of the loaded track in seconds
    pub fn duration(&self) -> Option<u32> {
        self.track.as_ref().and_then(|t| t.duration)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}

/// Owner of the playback snapshot
#[derive(Debug, Clone, Default)]
pub struct PlaybackStore {
    state: PlaybackState,
}

impl PlaybackStore {
    /// Create a store with the given initial state
    pub fn new(state: PlaybackState) -> Self {
        Self { state }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> &PlaybackState {
        &self.state
    }

    /// Commit a loaded track and rewind progress
    pub fn set_track(&mut self, track: Track) {
        self.state.track = Some(track);
        self.state.progress = 0.0;
    }

    /// Set the transport flag
    pub fn set_playing(&mut self, playing: bool) {
        self.state.playing = playing;
    }

    /// Stop the transport and rewind, keeping the track
    pub fn stop_track(&mut self) {
        self.state.playing = false;
        self.state.progress = 0.0;
    }

    /// Record playback progress
    ///
    /// Negative values become 0 and values past the loaded track's duration
    /// are clamped to it. With no track loaded the value is kept as given so
    /// a seek issued before loading is still observable. NaN is ignored and
    /// returns `false`.
    pub fn set_progress(&mut self, seconds: f64) -> bool {
        if seconds.is_nan() {
            return false;
        }
        let mut seconds = seconds.max(0.0);
        if let Some(duration) = self.state.duration() {
            seconds = seconds.min(f64::from(duration));
        }
        self.state.progress = seconds;
        true
    }

    /// Commit a queue position, returning `false` if out of range or no queue
    pub fn set_queue_index(&mut self, index: usize) -> bool {
        self.state
            .queue
            .as_mut()
            .is_some_and(|queue| queue.set_current(index))
    }

    /// Replace the queue
    pub fn set_queue(&mut self, queue: Option<Queue>) {
        self.state.queue = queue;
    }

    /// Mutable access to the queue for reshuffling and track list changes
    pub fn queue_mut(&mut self) -> Option<&mut Queue> {
        self.state.queue.as_mut()
    }

    /// Set mute state
    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
    }

    /// Set volume, clamped to 0.0..=1.0; NaN is ignored and returns `false`
    pub fn set_volume(&mut self, level: f32) -> bool {
        let mut volume = Volume::new(self.state.volume, self.state.muted);
        if !volume.set_level(level) {
            return false;
        }
        self.state.volume = volume.level();
        true
    }

    /// Set repeat mode
    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.state.repeat = repeat;
    }

    /// Set shuffle flag
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.state.shuffle = shuffle;
    }

    /// Forget the track, progress and queue; volume, mute, repeat and
    /// shuffle preferences survive
    pub fn clear(&mut self) {
        self.state.track = None;
        self.state.playing = false;
        self.state.progress = 0.0;
        self.state.queue = None;
    }
}
