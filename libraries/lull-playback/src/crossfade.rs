//! Crossfade bookkeeping for track transitions
//!
//! When a new track finishes loading, the previous handle fades out while
//! the new one fades in over the same duration:
//!
//! ```text
//! outgoing  volume ──────╲________   unload on Faded
//! incoming  0      ______╱────────
//!                  |<- duration ->|
//! ```
//!
//! At most one outgoing handle exists. Holding a new one unloads whatever
//! was still fading.

use crate::handle::{AudioHandle, HandleId};
use lull_core::TrackId;
use std::time::Duration;

/// A superseded handle waiting to fade out
struct OutgoingHandle {
    id: HandleId,
    handle: Box<dyn AudioHandle>,
    track_id: Option<TrackId>,
    fading: bool,
}

impl OutgoingHandle {
    fn unload(mut self) {
        self.handle.unload();
        tracing::debug!(handle = %self.id, "unloaded outgoing handle");
    }
}

/// Owner of the outgoing handle during a transition
pub struct Crossfade {
    duration: Duration,
    outgoing: Option<OutgoingHandle>,
}

impl Crossfade {
    /// Create a crossfade with the given fade length
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            outgoing: None,
        }
    }

    /// Fade length
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether an outgoing handle is held
    pub fn is_active(&self) -> bool {
        self.outgoing.is_some()
    }

    /// Id of the held outgoing handle
    pub fn outgoing_id(&self) -> Option<HandleId> {
        self.outgoing.as_ref().map(|o| o.id)
    }

    /// Take ownership of a superseded handle
    ///
    /// It keeps playing until [`Crossfade::begin`] starts the fade-out. Any
    /// handle still held from an earlier transition is unloaded first.
    pub(crate) fn hold(
        &mut self,
        id: HandleId,
        handle: Box<dyn AudioHandle>,
        track_id: Option<TrackId>,
    ) {
        self.discard();
        self.outgoing = Some(OutgoingHandle {
            id,
            handle,
            track_id,
            fading: false,
        });
    }

    /// Start fading out the held handle from `from_volume` to silence
    ///
    /// Returns the outgoing track id when a fade was started. With a zero
    /// duration the handle is unloaded immediately and `None` is returned.
    pub(crate) fn begin(&mut self, from_volume: f32) -> Option<TrackId> {
        if self.duration.is_zero() {
            self.discard();
            return None;
        }
        let outgoing = self.outgoing.as_mut()?;
        if outgoing.fading {
            return None;
        }
        outgoing.handle.fade(from_volume, 0.0, self.duration);
        outgoing.fading = true;
        tracing::debug!(handle = %outgoing.id, duration = ?self.duration, "fading out previous track");
        outgoing.track_id.clone()
    }

    /// Handle a `Faded` event, unloading the outgoing handle if it matches
    ///
    /// Returns `true` when the event completed the crossfade.
    pub(crate) fn finish(&mut self, id: HandleId) -> bool {
        match self.outgoing.take() {
            Some(outgoing) if outgoing.id == id && outgoing.fading => {
                outgoing.unload();
                true
            }
            other => {
                self.outgoing = other;
                false
            }
        }
    }

    /// Unload the outgoing handle immediately
    pub(crate) fn discard(&mut self) {
        if let Some(outgoing) = self.outgoing.take() {
            outgoing.unload();
        }
    }
}
