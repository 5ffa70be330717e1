//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Repeat mode
///
/// Governs what `next`, `previous` and the end of a track do. Only
/// `Playlist` consults the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the current track
    #[default]
    Off,

    /// Loop the current track
    Track,

    /// Walk the queue, wrapping at either end
    Playlist,
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepeatMode::Off => "off",
            RepeatMode::Track => "track",
            RepeatMode::Playlist => "playlist",
        };
        f.write_str(name)
    }
}
