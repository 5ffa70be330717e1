//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// A track could not be loaded or started; the message is user-facing
    #[error("Unable to play track: {0}")]
    UnableToPlay(String),

    /// The audio backend failed to create or drive a handle
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// Invalid queue construction
    #[error("Invalid queue: {0}")]
    InvalidQueue(String),

    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// The player service has shut down
    #[error("Player service is no longer running")]
    EngineClosed,

    /// Playlist/track lookup failed
    #[error(transparent)]
    Library(#[from] lull_core::LullError),
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
