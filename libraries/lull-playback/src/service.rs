//! Player service
//!
//! Runs a [`PlaybackEngine`] on one tokio task. UI intents, OS media
//! callbacks, handle lifecycle events and progress frames are all
//! serialized through that task, so the engine never sees two operations
//! at once. Each step publishes the new snapshot and the events it
//! produced.

use crate::{
    config::PlaybackConfig,
    engine::{ErrorCallback, PlaybackEngine},
    error::{PlaybackError, Result},
    events::PlayerEvent,
    handle::{AudioBackend, HandleMessage},
    queue::Queue,
    state::PlaybackState,
    types::RepeatMode,
};
use lull_core::{PlaylistId, PlaylistStore, Track, TrackId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const EVENT_CAPACITY: usize = 256;

/// Commands sent to the player task
///
/// Each variant maps onto one [`PlaybackEngine`] operation. Variants that
/// can fail synchronously carry a reply channel.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Play a track, crossfading from the current one
    Play(Track),

    /// Build the queue from a playlist and play one of its tracks
    PlayFromPlaylist {
        /// Playlist to queue
        playlist: PlaylistId,
        /// Track to start with
        track: TrackId,
        /// Receives the outcome of building the queue
        reply: oneshot::Sender<Result<()>>,
    },

    /// Seek to a position in seconds
    Seek(f64),

    /// Stop and rewind, keeping the track
    Stop,

    /// Skip forward under the repeat mode
    Next,

    /// Skip back under the repeat mode
    Previous,

    /// Play (`true`) or pause (`false`)
    SetPlaying(bool),

    /// Set the linear volume
    SetVolume(f32),

    /// Mute or unmute
    SetMuted(bool),

    /// Change the repeat mode
    SetRepeat(RepeatMode),

    /// Turn shuffle on or off
    SetShuffle(bool),

    /// Install or remove the queue
    SetQueue(Option<Queue>),

    /// Re-derive the queue from a changed track list
    RefreshQueue {
        /// New track list; empty removes the queue
        tracks: Vec<TrackId>,
        /// Receives the outcome
        reply: oneshot::Sender<Result<()>>,
    },

    /// Release all audio and forget the track and queue
    Reset,

    /// Stop the player task
    Shutdown,
}

/// Handle to the player task
///
/// Cheap to clone. Every command fails with
/// [`PlaybackError::EngineClosed`] once the task has shut down.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<PlayerCommand>,
    state: watch::Receiver<PlaybackState>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::EngineClosed)
    }

    /// Play a track, replacing the current one
    pub fn play(&self, track: Track) -> Result<()> {
        self.send(PlayerCommand::Play(track))
    }

    /// Queue a playlist and play one of its tracks
    ///
    /// Resolves once the queue is built; loading continues in the background.
    pub async fn play_from_playlist(&self, playlist: PlaylistId, track: TrackId) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::PlayFromPlaylist {
            playlist,
            track,
            reply,
        })?;
        rx.await.map_err(|_| PlaybackError::EngineClosed)?
    }

    /// Seek to a position in seconds
    pub fn seek(&self, seconds: f64) -> Result<()> {
        self.send(PlayerCommand::Seek(seconds))
    }

    /// Stop playback and rewind
    pub fn stop(&self) -> Result<()> {
        self.send(PlayerCommand::Stop)
    }

    /// Skip to the next track under the repeat mode
    pub fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next)
    }

    /// Skip back, or restart the track when well into it
    pub fn previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous)
    }

    /// Play or pause
    pub fn set_playing(&self, playing: bool) -> Result<()> {
        self.send(PlayerCommand::SetPlaying(playing))
    }

    /// Set volume (0.0-1.0)
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(PlayerCommand::SetVolume(volume))
    }

    /// Mute or unmute
    pub fn set_muted(&self, muted: bool) -> Result<()> {
        self.send(PlayerCommand::SetMuted(muted))
    }

    /// Set repeat mode
    pub fn set_repeat(&self, repeat: RepeatMode) -> Result<()> {
        self.send(PlayerCommand::SetRepeat(repeat))
    }

    /// Turn shuffle on or off
    pub fn set_shuffle(&self, shuffle: bool) -> Result<()> {
        self.send(PlayerCommand::SetShuffle(shuffle))
    }

    /// Install a queue directly, or remove it with `None`
    pub fn set_queue(&self, queue: Option<Queue>) -> Result<()> {
        self.send(PlayerCommand::SetQueue(queue))
    }

    /// Re-derive the queue from a changed track list
    pub async fn refresh_queue(&self, tracks: Vec<TrackId>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::RefreshQueue { tracks, reply })?;
        rx.await.map_err(|_| PlaybackError::EngineClosed)?
    }

    /// Release all audio and forget the track and queue
    pub fn reset(&self) -> Result<()> {
        self.send(PlayerCommand::Reset)
    }

    /// Stop the player task; it releases every handle on the way out
    pub fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown)
    }

    /// Latest published snapshot
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    /// Watch snapshots as they change
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Receive engine events from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

/// Spawns the player task
pub struct PlayerService;

impl PlayerService {
    /// Start a player on the current tokio runtime
    ///
    /// `on_error` receives the user-facing message for every track that
    /// could not be played.
    pub fn spawn(
        config: PlaybackConfig,
        library: Arc<dyn PlaylistStore>,
        backend: Box<dyn AudioBackend>,
        on_error: ErrorCallback,
    ) -> PlayerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (handle_tx, handle_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let engine = PlaybackEngine::new(config, library, backend, handle_tx, on_error);
        let (state_tx, state_rx) = watch::channel(engine.snapshot().clone());

        let handle = PlayerHandle {
            commands: command_tx,
            state: state_rx,
            events: events_tx.clone(),
        };

        tokio::spawn(run(engine, command_rx, handle_rx, state_tx, events_tx));
        handle
    }
}

async fn run(
    mut engine: PlaybackEngine,
    mut commands: mpsc::UnboundedReceiver<PlayerCommand>,
    mut handle_events: mpsc::UnboundedReceiver<HandleMessage>,
    state: watch::Sender<PlaybackState>,
    events: broadcast::Sender<PlayerEvent>,
) {
    info!("player service started");
    let mut frames = tokio::time::interval(engine.config().frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(PlayerCommand::Shutdown) | None => break,
                Some(command) => apply(&mut engine, command),
            },
            Some(message) = handle_events.recv() => {
                engine.on_handle_event(message.id, message.event);
            }
            now = frames.tick(), if engine.is_sampling() => engine.tick(now),
        }
        publish(&mut engine, &state, &events);
    }

    engine.reset();
    publish(&mut engine, &state, &events);
    info!("player service stopped");
}

fn apply(engine: &mut PlaybackEngine, command: PlayerCommand) {
    match command {
        PlayerCommand::Play(track) => engine.play(track),
        PlayerCommand::PlayFromPlaylist {
            playlist,
            track,
            reply,
        } => {
            let result = engine.play_from_playlist(&playlist, &track);
            if reply.send(result).is_err() {
                debug!("play_from_playlist caller went away");
            }
        }
        PlayerCommand::Seek(seconds) => engine.seek(seconds),
        PlayerCommand::Stop => engine.stop(),
        PlayerCommand::Next => engine.next(),
        PlayerCommand::Previous => engine.previous(),
        PlayerCommand::SetPlaying(playing) => engine.set_playing(playing),
        PlayerCommand::SetVolume(volume) => engine.set_volume(volume),
        PlayerCommand::SetMuted(muted) => engine.set_muted(muted),
        PlayerCommand::SetRepeat(repeat) => engine.set_repeat(repeat),
        PlayerCommand::SetShuffle(shuffle) => engine.set_shuffle(shuffle),
        PlayerCommand::SetQueue(queue) => engine.set_queue(queue),
        PlayerCommand::RefreshQueue { tracks, reply } => {
            let result = engine.refresh_queue(tracks);
            if reply.send(result).is_err() {
                debug!("refresh_queue caller went away");
            }
        }
        PlayerCommand::Reset => engine.reset(),
        PlayerCommand::Shutdown => {}
    }
}

fn publish(
    engine: &mut PlaybackEngine,
    state: &watch::Sender<PlaybackState>,
    events: &broadcast::Sender<PlayerEvent>,
) {
    let snapshot = engine.snapshot();
    state.send_if_modified(|current| {
        if current == snapshot {
            false
        } else {
            *current = snapshot.clone();
            true
        }
    });

    for event in engine.drain_events() {
        // No subscribers is fine
        let _ = events.send(event);
    }
}
