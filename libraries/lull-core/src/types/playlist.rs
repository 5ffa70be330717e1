/// Playlist domain types
use crate::error::{LullError, Result};
use crate::types::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Playlist background
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Background {
    /// One of the built-in backgrounds, referenced by token
    Preset(String),

    /// A custom image locator
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Self::Preset("default".to_string())
    }
}

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist title
    pub title: String,

    /// Background shown behind the playlist
    #[serde(default)]
    pub background: Background,

    /// Ordered track ids, no duplicates
    #[serde(default)]
    pub tracks: Vec<TrackId>,
}

/// Partial playlist update
///
/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPatch {
    /// New title
    pub title: Option<String>,

    /// New background
    pub background: Option<Background>,

    /// Replacement track list
    pub tracks: Option<Vec<TrackId>>,
}

impl Playlist {
    /// Create a new empty playlist
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(PlaylistId::generate(), title)
    }

    /// Create a playlist with a specific ID
    pub fn with_id(id: PlaylistId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            background: Background::default(),
            tracks: Vec::new(),
        }
    }

    /// Append a track
    ///
    /// # Errors
    /// Returns `DuplicateTrack` if the track is already in the playlist
    pub fn add_track(&mut self, track: TrackId) -> Result<()> {
        if self.contains(&track) {
            return Err(LullError::DuplicateTrack {
                playlist: self.id.clone(),
                track,
            });
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Remove a track, returning whether it was present
    pub fn remove_track(&mut self, track: &TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|id| id != track);
        self.tracks.len() != before
    }

    /// Check whether the playlist references a track
    pub fn contains(&self, track: &TrackId) -> bool {
        self.tracks.contains(track)
    }

    /// Position of a track in the playlist
    pub fn position(&self, track: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|id| id == track)
    }

    /// Apply a partial update
    ///
    /// The patch is validated before any field changes, so a rejected patch
    /// leaves the playlist untouched.
    pub fn apply(&mut self, patch: PlaylistPatch) -> Result<()> {
        if let Some(tracks) = &patch.tracks {
            let mut seen = HashSet::with_capacity(tracks.len());
            if let Some(dup) = tracks.iter().find(|id| !seen.insert(*id)) {
                return Err(LullError::DuplicateTrack {
                    playlist: self.id.clone(),
                    track: dup.clone(),
                });
            }
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(background) = patch.background {
            self.background = background;
        }
        if let Some(tracks) = patch.tracks {
            self.tracks = tracks;
        }
        Ok(())
    }
}
