//! Player events
//!
//! Event-based communication for UI synchronization. The engine queues
//! events as it works; the service drains and broadcasts them:
//! - Transport changes (play/pause/stop)
//! - Track changes (when the incoming track has loaded)
//! - Crossfade start and completion
//! - Position commits (throttled, about once a second)
//! - Queue position commits
//! - Errors surfaced to the user

use crate::handle::HandleId;
use lull_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Transport flag changed
    StateChanged {
        /// Whether audio is now playing
        playing: bool,
    },

    /// A new track was committed after loading
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
        /// Duration in whole seconds, `None` for streams of unknown length
        duration_secs: Option<u32>,
    },

    /// Crossfade started between two tracks
    CrossfadeStarted {
        /// ID of the outgoing track
        from_track_id: TrackId,
        /// ID of the incoming track
        to_track_id: TrackId,
        /// Duration of the crossfade in milliseconds
        duration_ms: u32,
    },

    /// The outgoing handle finished fading and was released
    CrossfadeCompleted {
        /// Released handle
        handle: HandleId,
    },

    /// Position committed
    PositionUpdate {
        /// Seconds elapsed
        position_secs: f64,
    },

    /// Queue position committed
    QueueIndexChanged {
        /// New position
        index: usize,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Linear level
        volume: f32,
        /// Whether audio is muted
        muted: bool,
    },

    /// A track could not be played
    Error {
        /// User-facing message
        message: String,
    },
}
