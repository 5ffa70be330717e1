//! Lull Player - Playback Engine
//!
//! Platform-agnostic playback for playlist-based players.
//!
//! This crate provides:
//! - Playback state store (track, transport, volume/mute, progress, queue)
//! - Audio handle capability with tagged lifecycle events
//! - Crossfaded track transitions
//! - Throttled progress sampling (about once a second)
//! - Next/previous with repeat (off, track, playlist) and shuffle
//! - Auto-advance on track end
//! - Player service on a single tokio task
//! - OS media session bridge
//!
//! # Architecture
//!
//! `lull-playback` never touches audio output itself. The platform supplies
//! an [`AudioBackend`] that creates [`AudioHandle`]s (desktop output, browser
//! audio element, test double); the engine drives them through the trait
//! and listens for their events on a channel.
//!
//! [`PlaybackEngine`] is synchronous and deterministic. [`PlayerService`]
//! runs it on one task and feeds it commands, handle events and progress
//! frames in order.
//!
//! # Example: Platform Integration
//!
//! ```rust
//! use lull_core::{MemoryPlaylistStore, Track};
//! use lull_playback::{
//!     AudioBackend, AudioHandle, HandleEvent, HandleEvents, LoadOptions, PlaybackConfig,
//!     PlaybackEngine, Result,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // A platform handle wrapping one audio resource
//! struct SilentHandle {
//!     events: HandleEvents,
//!     playing: bool,
//! }
//!
//! impl AudioHandle for SilentHandle {
//!     fn load(&mut self, _url: &str, _options: LoadOptions) -> Result<()> {
//!         // Real handles report this once the resource is ready
//!         self.events.emit(HandleEvent::Loaded);
//!         Ok(())
//!     }
//!     fn has_resource(&self) -> bool { true }
//!     fn play(&mut self) { self.playing = true; }
//!     fn pause(&mut self) { self.playing = false; }
//!     fn stop(&mut self) { self.playing = false; }
//!     fn seek(&mut self, _seconds: f64) {}
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn set_muted(&mut self, _muted: bool) {}
//!     fn fade(&mut self, _from: f32, _to: f32, _duration: Duration) {}
//!     fn unload(&mut self) { self.playing = false; }
//!     fn position(&self) -> f64 { 0.0 }
//!     fn duration(&self) -> Option<f64> { Some(180.0) }
//!     fn is_playing(&self) -> bool { self.playing }
//! }
//!
//! struct SilentBackend;
//!
//! impl AudioBackend for SilentBackend {
//!     fn create(&mut self, events: HandleEvents) -> Result<Box<dyn AudioHandle>> {
//!         Ok(Box::new(SilentHandle { events, playing: false }))
//!     }
//! }
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut engine = PlaybackEngine::new(
//!     PlaybackConfig::default(),
//!     Arc::new(MemoryPlaylistStore::new()),
//!     Box::new(SilentBackend),
//!     tx,
//!     Box::new(|message| eprintln!("{message}")),
//! );
//!
//! engine.play(Track::new("Tide", "https://cdn.example.com/tide.mp3"));
//!
//! // Deliver handle events back to the engine
//! while let Ok(message) = rx.try_recv() {
//!     engine.on_handle_event(message.id, message.event);
//! }
//!
//! assert!(engine.snapshot().playing);
//! assert_eq!(engine.snapshot().duration(), Some(180));
//! ```

mod config;
mod crossfade;
mod engine;
mod error;
mod events;
mod handle;
pub mod media_session;
mod progress;
mod queue;
mod service;
mod shuffle;
mod state;
pub mod types;
mod volume;

// Public exports
pub use config::{PlaybackConfig, ENV_PREFIX};
pub use engine::{ErrorCallback, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use handle::{
    AudioBackend, AudioHandle, HandleEvent, HandleEvents, HandleId, HandleMessage, LoadOptions,
};
pub use media_session::{
    ActionHandler, MediaAction, MediaActionDetails, MediaMetadata, MediaPlaybackState,
    MediaSession, MediaSessionBridge, TransportControls,
};
pub use progress::ProgressSampler;
pub use queue::Queue;
pub use service::{PlayerCommand, PlayerHandle, PlayerService};
pub use shuffle::{is_permutation, shuffled_order};
pub use state::{PlaybackState, PlaybackStore};
pub use types::RepeatMode;
pub use volume::Volume;
