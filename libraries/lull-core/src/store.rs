//! Playlist store interface
//!
//! The playback engine reads tracks through [`PlaylistStore`]; the
//! presentation layer also edits playlists through it. Both hold the same
//! store behind an `Arc`, so implementations use interior mutability.

use crate::error::{LullError, Result};
use crate::types::{Playlist, PlaylistId, PlaylistPatch, Track, TrackId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read/edit access to playlists and tracks keyed by id
pub trait PlaylistStore: Send + Sync {
    /// Look up a track
    fn track(&self, id: &TrackId) -> Option<Track>;

    /// Look up a playlist
    fn playlist(&self, id: &PlaylistId) -> Option<Playlist>;

    /// All playlists, in insertion order
    fn playlists(&self) -> Vec<Playlist>;

    /// Apply a partial update to a playlist, returning the updated playlist
    fn edit_playlist(&self, id: &PlaylistId, patch: PlaylistPatch) -> Result<Playlist>;

    /// Remove a playlist, returning it
    fn remove_playlist(&self, id: &PlaylistId) -> Result<Playlist>;

    /// Select a playlist, or clear the selection with `None`
    fn select_playlist(&self, id: Option<PlaylistId>) -> Result<()>;

    /// Currently selected playlist
    fn selected_playlist(&self) -> Option<PlaylistId>;
}

#[derive(Debug, Default)]
struct Library {
    tracks: HashMap<TrackId, Track>,
    playlists: Vec<Playlist>,
    selected: Option<PlaylistId>,
}

impl Library {
    fn playlist_mut(&mut self, id: &PlaylistId) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| LullError::PlaylistNotFound(id.clone()))
    }
}

/// In-memory playlist store
#[derive(Debug, Default)]
pub struct MemoryPlaylistStore {
    inner: RwLock<Library>,
}

impl MemoryPlaylistStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Library> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Library> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a track
    pub fn add_track(&self, track: Track) {
        self.write().tracks.insert(track.id.clone(), track);
    }

    /// Remove a track from the library and from every playlist
    ///
    /// Queues built before the removal keep the id; the engine skips such
    /// entries when it tries to resolve them.
    pub fn remove_track(&self, id: &TrackId) -> Result<Track> {
        let mut library = self.write();
        let track = library
            .tracks
            .remove(id)
            .ok_or_else(|| LullError::TrackNotFound(id.clone()))?;
        for playlist in &mut library.playlists {
            playlist.remove_track(id);
        }
        tracing::debug!(track = %id, "removed track from library");
        Ok(track)
    }

    /// Add or replace a playlist
    pub fn add_playlist(&self, playlist: Playlist) {
        let mut library = self.write();
        if let Some(existing) = library.playlists.iter_mut().find(|p| p.id == playlist.id) {
            *existing = playlist;
        } else {
            library.playlists.push(playlist);
        }
    }
}

impl PlaylistStore for MemoryPlaylistStore {
    fn track(&self, id: &TrackId) -> Option<Track> {
        self.read().tracks.get(id).cloned()
    }

    fn playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        self.read().playlists.iter().find(|p| &p.id == id).cloned()
    }

    fn playlists(&self) -> Vec<Playlist> {
        self.read().playlists.clone()
    }

    fn edit_playlist(&self, id: &PlaylistId, patch: PlaylistPatch) -> Result<Playlist> {
        let mut library = self.write();
        let playlist = library.playlist_mut(id)?;
        playlist.apply(patch)?;
        Ok(playlist.clone())
    }

    fn remove_playlist(&self, id: &PlaylistId) -> Result<Playlist> {
        let mut library = self.write();
        let index = library
            .playlists
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| LullError::PlaylistNotFound(id.clone()))?;
        if library.selected.as_ref() == Some(id) {
            library.selected = None;
        }
        Ok(library.playlists.remove(index))
    }

    fn select_playlist(&self, id: Option<PlaylistId>) -> Result<()> {
        let mut library = self.write();
        if let Some(id) = &id {
            if !library.playlists.iter().any(|p| &p.id == id) {
                return Err(LullError::PlaylistNotFound(id.clone()));
            }
        }
        library.selected = id;
        Ok(())
    }

    fn selected_playlist(&self) -> Option<PlaylistId> {
        self.read().selected.clone()
    }
}
