//! Audio resource handle capability
//!
//! A handle owns one loadable, playable audio resource. Concrete handles
//! (desktop output, browser audio, a test double) are provided by the
//! platform through [`AudioBackend`]; the engine only talks to the trait.
//!
//! Lifecycle events travel back over a channel tagged with the handle's
//! [`HandleId`], so the engine can discard events from handles it no longer
//! considers active.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Identity of one handle, unique per engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(u64);

impl HandleId {
    /// Wrap a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Options passed to [`AudioHandle::load`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Stream the resource with chunked transfer instead of buffering it whole
    pub stream: bool,

    /// Initial volume
    pub volume: f32,

    /// Initial mute state
    pub muted: bool,
}

/// Lifecycle events a handle emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleEvent {
    /// The resource is ready; playback commands are now meaningful
    Loaded,

    /// The resource could not be fetched or decoded
    LoadError(String),

    /// The resource loaded but playback could not start
    PlayError(String),

    /// A fade requested with [`AudioHandle::fade`] finished
    Faded,

    /// Playback reached the end of the resource
    Ended,
}

/// An event tagged with the handle that emitted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleMessage {
    /// Emitting handle
    pub id: HandleId,

    /// What happened
    pub event: HandleEvent,
}

/// Sink a handle uses to report lifecycle events
#[derive(Debug, Clone)]
pub struct HandleEvents {
    id: HandleId,
    tx: UnboundedSender<HandleMessage>,
}

impl HandleEvents {
    /// Create a sink for the given handle
    pub fn new(id: HandleId, tx: UnboundedSender<HandleMessage>) -> Self {
        Self { id, tx }
    }

    /// Handle this sink reports for
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Report an event
    ///
    /// Returns `false` once the engine has gone away; handles may ignore it.
    pub fn emit(&self, event: HandleEvent) -> bool {
        self.tx
            .send(HandleMessage { id: self.id, event })
            .is_ok()
    }
}

/// One playable audio resource
///
/// Until `Loaded` or `LoadError` has been emitted, only `unload` is
/// meaningful. `unload` is terminal: the handle releases its resource and
/// must not emit further events.
pub trait AudioHandle: Send {
    /// Start loading a resource
    ///
    /// Completion is reported asynchronously through `Loaded`/`LoadError`.
    ///
    /// # Errors
    /// Returns an error when loading cannot even be attempted
    fn load(&mut self, url: &str, options: LoadOptions) -> Result<()>;

    /// Whether the handle has an underlying playable resource
    ///
    /// Checked right after `load`; `false` is treated as a load failure.
    fn has_resource(&self) -> bool;

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Stop playback and rewind
    fn stop(&mut self);

    /// Seek to a position in seconds
    fn seek(&mut self, seconds: f64);

    /// Set volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    /// Set mute state
    fn set_muted(&mut self, muted: bool);

    /// Ramp volume, emitting `Faded` when done
    fn fade(&mut self, from: f32, to: f32, duration: Duration);

    /// Release the resource; no events afterwards
    fn unload(&mut self);

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Total duration in seconds, unknown until loaded
    fn duration(&self) -> Option<f64>;

    /// Whether audio is currently playing
    fn is_playing(&self) -> bool;
}

/// Factory for platform audio handles
pub trait AudioBackend: Send {
    /// Construct a handle that reports through `events`
    ///
    /// # Errors
    /// Construction failures are treated like a load failure of the track
    fn create(&mut self, events: HandleEvents) -> Result<Box<dyn AudioHandle>>;
}
