//! Domain types for Lull Player

mod ids;
mod playlist;
mod track;

pub use ids::{PlaylistId, TrackId};
pub use playlist::{Background, Playlist, PlaylistPatch};
pub use track::Track;
