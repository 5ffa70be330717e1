//! Playback queue
//!
//! The queue keeps the playlist order untouched and carries a separate
//! shuffle permutation over its positions:
//!
//! ```text
//! tracks:   [A, B, C, D]      playlist order, never reordered
//! shuffled: [2, 0, 3, 1]      walk order used while shuffle is on
//! current:  1                 position last committed by the engine
//! ```
//!
//! With shuffle off, position `i` plays `tracks[i]`; with shuffle on it
//! plays `tracks[shuffled[i]]`.

use crate::error::{PlaybackError, Result};
use crate::shuffle::{is_permutation, shuffled_order};
use lull_core::TrackId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ordered track ids with a shuffle permutation and a current position
///
/// Deserialization runs the same checks as [`Queue::with_order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQueue")]
pub struct Queue {
    /// Track ids in playlist order
    tracks: Vec<TrackId>,

    /// Permutation of `0..tracks.len()`
    shuffled: Vec<usize>,

    /// Always a valid position in `tracks`
    current: usize,
}

/// Wire form of a queue before validation
#[derive(Deserialize)]
struct RawQueue {
    tracks: Vec<TrackId>,
    shuffled: Vec<usize>,
    current: usize,
}

impl TryFrom<RawQueue> for Queue {
    type Error = PlaybackError;

    fn try_from(raw: RawQueue) -> Result<Self> {
        Self::with_order(raw.tracks, raw.shuffled, raw.current)
    }
}

impl Queue {
    /// Create a queue with identity shuffle order
    ///
    /// # Errors
    /// Fails if `tracks` is empty or `current` is out of range
    pub fn new(tracks: Vec<TrackId>, current: usize) -> Result<Self> {
        let shuffled = (0..tracks.len()).collect();
        Self::with_order(tracks, shuffled, current)
    }

    /// Create a queue with an explicit shuffle order
    ///
    /// # Errors
    /// Fails if `tracks` is empty, `current` is out of range, or `shuffled`
    /// is not a permutation of the track positions
    pub fn with_order(tracks: Vec<TrackId>, shuffled: Vec<usize>, current: usize) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlaybackError::InvalidQueue("queue has no tracks".to_string()));
        }
        if current >= tracks.len() {
            return Err(PlaybackError::InvalidQueue(format!(
                "current position {current} out of range for {} tracks",
                tracks.len()
            )));
        }
        if shuffled.len() != tracks.len() || !is_permutation(&shuffled) {
            return Err(PlaybackError::InvalidQueue(format!(
                "shuffle order {shuffled:?} is not a permutation of 0..{}",
                tracks.len()
            )));
        }
        Ok(Self {
            tracks,
            shuffled,
            current,
        })
    }

    /// Recompute the shuffle permutation
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shuffled = shuffled_order(self.tracks.len(), rng);
    }

    /// Replace the underlying track list
    ///
    /// The shuffle order resets to identity (callers reshuffle if shuffle is
    /// on). `current` follows `playing` to its new position when it is still
    /// present, otherwise it is clamped to the new length.
    ///
    /// # Errors
    /// Fails on an empty list, leaving the queue untouched
    pub fn replace_tracks(&mut self, tracks: Vec<TrackId>, playing: Option<&TrackId>) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::InvalidQueue("queue has no tracks".to_string()));
        }

        self.current = playing
            .and_then(|id| tracks.iter().position(|t| t == id))
            .unwrap_or_else(|| self.current.min(tracks.len() - 1));
        self.shuffled = (0..tracks.len()).collect();
        self.tracks = tracks;
        Ok(())
    }

    /// Track ids in playlist order
    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    /// Shuffle permutation
    pub fn shuffled(&self) -> &[usize] {
        &self.shuffled
    }

    /// Current position
    pub fn current(&self) -> usize {
        self.current
    }

    /// Set the current position, returning `false` if out of range
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always `false` for a constructed queue
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Position after `position`, wrapping to the start
    pub fn index_after(&self, position: usize) -> usize {
        (position + 1).checked_rem(self.tracks.len()).unwrap_or(0)
    }

    /// Position before `position`, wrapping to the end
    ///
    /// With `step_back == false` the position itself is returned (restart in
    /// place).
    pub fn index_before(&self, position: usize, step_back: bool) -> usize {
        if !step_back {
            position
        } else {
            position
                .checked_sub(1)
                .unwrap_or_else(|| self.tracks.len().saturating_sub(1))
        }
    }

    /// Track id at a position, honouring the shuffle order when `shuffle` is set
    pub fn resolve(&self, index: usize, shuffle: bool) -> Option<&TrackId> {
        let position = if shuffle {
            *self.shuffled.get(index)?
        } else {
            index
        };
        self.tracks.get(position)
    }
}
