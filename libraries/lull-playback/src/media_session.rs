//! OS media session bridge
//!
//! Connects the platform's media session (lock screen, media keys,
//! notification controls) to the player:
//!
//! - OS actions are forwarded to [`TransportControls`]
//! - the current track title is mirrored into the session metadata
//! - the playing flag is mirrored into the session playback state
//!
//! Handlers can fire at any time; they only enqueue commands, so the player
//! task stays the single place where playback state changes.

use crate::error::Result;
use crate::service::PlayerHandle;
use crate::state::PlaybackState;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Actions the OS can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaAction {
    Play,
    Pause,
    Stop,
    SeekTo,
    PreviousTrack,
    NextTrack,
}

impl MediaAction {
    /// Every action the bridge registers
    pub const ALL: [MediaAction; 6] = [
        MediaAction::Play,
        MediaAction::Pause,
        MediaAction::Stop,
        MediaAction::SeekTo,
        MediaAction::PreviousTrack,
        MediaAction::NextTrack,
    ];

    /// OS-level action name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::SeekTo => "seekto",
            Self::PreviousTrack => "previoustrack",
            Self::NextTrack => "nexttrack",
        }
    }
}

impl fmt::Display for MediaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments passed with an action
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaActionDetails {
    /// Target position for `seekto`
    pub seek_time: Option<f64>,
}

/// Metadata shown by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
}

/// Playback state shown by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPlaybackState {
    Playing,
    Paused,
}

impl MediaPlaybackState {
    /// OS-level state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Callback invoked by the OS for one action
pub type ActionHandler = Arc<dyn Fn(MediaActionDetails) + Send + Sync>;

/// Platform media session capability
pub trait MediaSession: Send {
    /// Register or clear (with `None`) the handler for an action,
    /// replacing any handler already registered for it
    fn set_action_handler(&mut self, action: MediaAction, handler: Option<ActionHandler>);

    /// Set or clear the displayed metadata
    fn set_metadata(&mut self, metadata: Option<MediaMetadata>);

    /// Set the displayed playback state
    fn set_playback_state(&mut self, state: MediaPlaybackState);
}

/// Operations the OS actions drive
pub trait TransportControls: Send + Sync {
    fn set_playing(&self, playing: bool) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn seek(&self, seconds: f64) -> Result<()>;
    fn previous(&self) -> Result<()>;
    fn next(&self) -> Result<()>;
}

impl TransportControls for PlayerHandle {
    fn set_playing(&self, playing: bool) -> Result<()> {
        PlayerHandle::set_playing(self, playing)
    }

    fn stop(&self) -> Result<()> {
        PlayerHandle::stop(self)
    }

    fn seek(&self, seconds: f64) -> Result<()> {
        PlayerHandle::seek(self, seconds)
    }

    fn previous(&self) -> Result<()> {
        PlayerHandle::previous(self)
    }

    fn next(&self) -> Result<()> {
        PlayerHandle::next(self)
    }
}

/// Keeps a [`MediaSession`] registered against the player
///
/// Dropping the bridge clears every handler it registered.
pub struct MediaSessionBridge<S: MediaSession> {
    session: S,

    // Last values pushed to the session; `None` until first sync
    title: Option<Option<String>>,
    playback: Option<MediaPlaybackState>,
}

impl<S: MediaSession> MediaSessionBridge<S> {
    /// Register handlers for every action against `controls`
    pub fn new(session: S, controls: Arc<dyn TransportControls>) -> Self {
        let mut bridge = Self {
            session,
            title: None,
            playback: None,
        };
        bridge.rebind(controls);
        bridge
    }

    /// Replace every registered handler with ones bound to `controls`
    pub fn rebind(&mut self, controls: Arc<dyn TransportControls>) {
        for action in MediaAction::ALL {
            let handler = action_handler(action, Arc::clone(&controls));
            self.session.set_action_handler(action, Some(handler));
        }
        debug!("media session handlers registered");
    }

    /// Mirror the title and playing flag, pushing only what changed
    pub fn sync(&mut self, state: &PlaybackState) {
        let title = state.track.as_ref().map(|track| track.title.clone());
        if self.title.as_ref() != Some(&title) {
            self.session
                .set_metadata(title.clone().map(|title| MediaMetadata { title }));
            self.title = Some(title);
        }

        let playback = if state.playing {
            MediaPlaybackState::Playing
        } else {
            MediaPlaybackState::Paused
        };
        if self.playback != Some(playback) {
            self.session.set_playback_state(playback);
            self.playback = Some(playback);
        }
    }

    /// Mirror every snapshot until the player shuts down
    pub async fn run(&mut self, mut state: watch::Receiver<PlaybackState>) {
        loop {
            let snapshot = state.borrow_and_update().clone();
            self.sync(&snapshot);
            if state.changed().await.is_err() {
                debug!("player state closed; media session bridge stopping");
                return;
            }
        }
    }

    /// The wrapped session
    pub fn session(&self) -> &S {
        &self.session
    }
}

impl<S: MediaSession> Drop for MediaSessionBridge<S> {
    fn drop(&mut self) {
        for action in MediaAction::ALL {
            self.session.set_action_handler(action, None);
        }
    }
}

fn action_handler(action: MediaAction, controls: Arc<dyn TransportControls>) -> ActionHandler {
    Arc::new(move |details: MediaActionDetails| {
        debug!(%action, "media session action");
        let result = match action {
            MediaAction::Play => controls.set_playing(true),
            MediaAction::Pause => controls.set_playing(false),
            MediaAction::Stop => controls.stop(),
            MediaAction::SeekTo => match details.seek_time.filter(|t| t.is_finite()) {
                Some(seconds) => controls.seek(seconds),
                None => {
                    debug!("seekto without a numeric time; ignoring");
                    Ok(())
                }
            },
            MediaAction::PreviousTrack => controls.previous(),
            MediaAction::NextTrack => controls.next(),
        };
        if let Err(err) = result {
            warn!(%action, %err, "media session action not delivered");
        }
    })
}
