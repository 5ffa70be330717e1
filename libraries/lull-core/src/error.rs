/// Core error types for Lull Player
use thiserror::Error;
use crate::types::{PlaylistId, TrackId};

/// Result type alias using `LullError`
pub type Result<T> = std::result::Result<T, LullError>;

/// Core error type for Lull Player
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LullError {
    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// A playlist may reference each track at most once
    #[error("Track {track} is already in playlist {playlist}")]
    DuplicateTrack {
        /// Playlist that rejected the track
        playlist: PlaylistId,
        /// Offending track
        track: TrackId,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LullError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
