//! Shared test rig: a recording mock backend and an engine wired to it

#![allow(dead_code)]

use lull_core::{MemoryPlaylistStore, Playlist, PlaylistId, Track, TrackId};
use lull_playback::{
    AudioBackend, AudioHandle, HandleEvent, HandleEvents, HandleId, HandleMessage, LoadOptions,
    PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackState, PlayerEvent, RepeatMode,
    Result,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// ===== Mock Handle =====

/// Everything a mock handle was asked to do, plus its simulated playback
#[derive(Debug, Default)]
pub struct HandleLog {
    pub url: String,
    pub calls: Vec<String>,
    pub playing: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub volume: f32,
    pub muted: bool,
    pub unloaded: bool,
}

struct MockHandle {
    log: Arc<Mutex<HandleLog>>,
    backend: Arc<Mutex<BackendInner>>,
}

impl MockHandle {
    fn record(&self, call: impl Into<String>) {
        self.log.lock().unwrap().calls.push(call.into());
    }
}

impl AudioHandle for MockHandle {
    fn load(&mut self, url: &str, options: LoadOptions) -> Result<()> {
        self.record(format!(
            "load {url} stream={} volume={} muted={}",
            options.stream, options.volume, options.muted
        ));
        if self.backend.lock().unwrap().fail_load_urls.contains(url) {
            return Err(PlaybackError::Backend("connection refused".to_string()));
        }
        let mut log = self.log.lock().unwrap();
        log.url = url.to_string();
        log.volume = options.volume;
        log.muted = options.muted;
        Ok(())
    }

    fn has_resource(&self) -> bool {
        let url = self.log.lock().unwrap().url.clone();
        !self.backend.lock().unwrap().no_resource_urls.contains(&url)
    }

    fn play(&mut self) {
        self.record("play");
        self.log.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.record("pause");
        self.log.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        self.record("stop");
        let mut log = self.log.lock().unwrap();
        log.playing = false;
        log.position = 0.0;
    }

    fn seek(&mut self, seconds: f64) {
        self.record(format!("seek {seconds}"));
        self.log.lock().unwrap().position = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(format!("volume {volume}"));
        self.log.lock().unwrap().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(format!("muted {muted}"));
        self.log.lock().unwrap().muted = muted;
    }

    fn fade(&mut self, from: f32, to: f32, duration: Duration) {
        self.record(format!("fade {from}->{to} {}ms", duration.as_millis()));
    }

    fn unload(&mut self) {
        self.record("unload");
        let mut log = self.log.lock().unwrap();
        log.unloaded = true;
        log.playing = false;
    }

    fn position(&self) -> f64 {
        self.log.lock().unwrap().position
    }

    fn duration(&self) -> Option<f64> {
        self.log.lock().unwrap().duration
    }

    fn is_playing(&self) -> bool {
        self.log.lock().unwrap().playing
    }
}

// ===== Mock Backend =====

#[derive(Default)]
struct BackendInner {
    handles: Vec<(HandleEvents, Arc<Mutex<HandleLog>>)>,
    fail_create: bool,
    fail_load_urls: HashSet<String>,
    no_resource_urls: HashSet<String>,
}

/// Backend creating [`MockHandle`]s; clones share state with the engine's copy
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<BackendInner>>,
}

/// Reported duration of every mock resource
pub const TRACK_SECONDS: f64 = 200.7;

impl MockBackend {
    pub fn fail_create(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create = fail;
    }

    pub fn fail_load(&self, url: &str) {
        self.inner.lock().unwrap().fail_load_urls.insert(url.to_string());
    }

    pub fn without_resource(&self, url: &str) {
        self.inner
            .lock()
            .unwrap()
            .no_resource_urls
            .insert(url.to_string());
    }

    pub fn handle_count(&self) -> usize {
        self.inner.lock().unwrap().handles.len()
    }

    pub fn log(&self, index: usize) -> Arc<Mutex<HandleLog>> {
        Arc::clone(&self.inner.lock().unwrap().handles[index].1)
    }

    pub fn id(&self, index: usize) -> HandleId {
        self.inner.lock().unwrap().handles[index].0.id()
    }

    pub fn emit(&self, index: usize, event: HandleEvent) {
        let events = self.inner.lock().unwrap().handles[index].0.clone();
        events.emit(event);
    }
}

impl AudioBackend for MockBackend {
    fn create(&mut self, events: HandleEvents) -> Result<Box<dyn AudioHandle>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_create {
            return Err(PlaybackError::Backend("no audio device".to_string()));
        }
        let log = Arc::new(Mutex::new(HandleLog {
            duration: Some(TRACK_SECONDS),
            ..HandleLog::default()
        }));
        inner.handles.push((events, Arc::clone(&log)));
        Ok(Box::new(MockHandle {
            log,
            backend: Arc::clone(&self.inner),
        }))
    }
}

// ===== Library =====

pub fn track(name: &str) -> Track {
    Track::with_id(
        TrackId::new(name),
        format!("Track {name}"),
        format!("https://cdn.test/{name}.mp3"),
    )
}

pub fn mix_id() -> PlaylistId {
    PlaylistId::new("mix")
}

/// Library holding the named tracks and a "mix" playlist of all of them
pub fn library(names: &[&str]) -> Arc<MemoryPlaylistStore> {
    let store = MemoryPlaylistStore::new();
    let mut playlist = Playlist::with_id(mix_id(), "Mix");
    for name in names {
        let track = track(name);
        playlist.add_track(track.id.clone()).unwrap();
        store.add_track(track);
    }
    store.add_playlist(playlist);
    Arc::new(store)
}

pub fn ids(names: &[&str]) -> Vec<TrackId> {
    names.iter().map(|name| TrackId::new(*name)).collect()
}

pub fn test_config() -> PlaybackConfig {
    PlaybackConfig {
        shuffle_seed: Some(7),
        ..PlaybackConfig::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ===== Engine Rig =====

/// Engine wired to a mock backend, delivering handle events on demand
pub struct Rig {
    pub engine: PlaybackEngine,
    pub backend: MockBackend,
    pub library: Arc<MemoryPlaylistStore>,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub events: Vec<PlayerEvent>,
    rx: UnboundedReceiver<HandleMessage>,
}

impl Rig {
    pub fn new(names: &[&str]) -> Self {
        Self::with_config(names, test_config())
    }

    pub fn with_config(names: &[&str], config: PlaybackConfig) -> Self {
        init_tracing();
        let backend = MockBackend::default();
        let library = library(names);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = PlaybackEngine::new(
            config,
            library.clone(),
            Box::new(backend.clone()),
            tx,
            Box::new(move |message: &str| sink.lock().unwrap().push(message.to_string())),
        );
        Self {
            engine,
            backend,
            library,
            errors,
            events: Vec::new(),
            rx,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        self.engine.snapshot()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// Deliver every queued handle event and collect engine events
    pub fn pump(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.engine.on_handle_event(message.id, message.event);
        }
        self.events.extend(self.engine.drain_events());
    }

    /// Start playing a library track without completing its load
    pub fn play(&mut self, name: &str) {
        self.engine.play(track(name));
        self.pump();
    }

    /// Emit an event from the handle created `index`-th and deliver it
    pub fn emit(&mut self, index: usize, event: HandleEvent) {
        self.backend.emit(index, event);
        self.pump();
    }

    /// Complete the load of the most recently created handle
    pub fn load_latest(&mut self) {
        let index = self.latest();
        self.emit(index, HandleEvent::Loaded);
    }

    pub fn play_loaded(&mut self, name: &str) {
        self.play(name);
        self.load_latest();
    }

    /// Build the "mix" queue and play one of its tracks to the loaded state
    pub fn play_from_mix(&mut self, name: &str) {
        self.engine
            .play_from_playlist(&mix_id(), &TrackId::new(name))
            .unwrap();
        self.pump();
        self.load_latest();
    }

    pub fn next(&mut self) {
        self.engine.next();
        self.pump();
    }

    pub fn previous(&mut self) {
        self.engine.previous();
        self.pump();
    }

    pub fn latest(&self) -> usize {
        self.backend.handle_count() - 1
    }

    pub fn calls(&self, index: usize) -> Vec<String> {
        self.backend.log(index).lock().unwrap().calls.clone()
    }

    pub fn is_unloaded(&self, index: usize) -> bool {
        self.backend.log(index).lock().unwrap().unloaded
    }

    pub fn set_position(&self, index: usize, seconds: f64) {
        self.backend.log(index).lock().unwrap().position = seconds;
    }

    pub fn current_track(&self) -> Option<TrackId> {
        self.state().track.as_ref().map(|t| t.id.clone())
    }

    pub fn queue_current(&self) -> usize {
        self.state().queue.as_ref().unwrap().current()
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.engine.set_repeat(repeat);
    }
}
