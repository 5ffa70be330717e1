/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Audio track
///
/// Tracks are immutable once created. The duration is unknown until the
/// audio backend has loaded the resource once; the playback engine then
/// commits a copy with the duration fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Resource locator (local path or remote URL), opaque to the core
    pub url: String,

    /// Whole seconds, known after the first successful load
    #[serde(default)]
    pub duration: Option<u32>,
}

impl Track {
    /// Create a new track with a generated id
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_id(TrackId::generate(), title, url)
    }

    /// Create a track with a specific ID
    pub fn with_id(id: TrackId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            duration: None,
        }
    }

    /// Copy of this track with its duration fixed
    #[must_use]
    pub fn with_duration(&self, seconds: u32) -> Self {
        Self {
            duration: Some(seconds),
            ..self.clone()
        }
    }
}
