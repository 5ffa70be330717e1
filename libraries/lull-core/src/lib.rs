//! Lull Player Core
//!
//! Platform-agnostic domain types, the playlist store interface and error
//! handling shared by the playback engine and whatever presentation layer
//! drives it.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `Background`, typed ids
//! - **Playlist Store**: the `PlaylistStore` trait the engine reads tracks
//!   through, plus `MemoryPlaylistStore`
//! - **Error Handling**: Unified `LullError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lull_core::{MemoryPlaylistStore, Playlist, PlaylistStore, Track};
//!
//! let store = MemoryPlaylistStore::new();
//!
//! let track = Track::new("Rain on Tin", "https://cdn.example.com/rain.mp3");
//! let mut playlist = Playlist::new("Sleep");
//! playlist.add_track(track.id.clone()).unwrap();
//!
//! store.add_track(track.clone());
//! store.add_playlist(playlist.clone());
//!
//! assert_eq!(store.track(&track.id), Some(track));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{LullError, Result};
pub use store::{MemoryPlaylistStore, PlaylistStore};
pub use types::{Background, Playlist, PlaylistId, PlaylistPatch, Track, TrackId};
