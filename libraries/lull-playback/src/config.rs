//! Player configuration
//!
//! Defaults are baked in; an optional TOML file and `LULL_`-prefixed
//! environment variables override them, in that order.

use crate::error::{PlaybackError, Result};
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides (`LULL_CROSSFADE_MS=500`)
pub const ENV_PREFIX: &str = "LULL";

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Initial mute state (default: false)
    #[serde(default)]
    pub muted: bool,

    /// Initial repeat mode (default: Off)
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Initial shuffle state (default: false)
    #[serde(default)]
    pub shuffle: bool,

    /// Crossfade length between tracks in milliseconds (default: 1000)
    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: u32,

    /// Minimum time between progress commits in milliseconds (default: 1000)
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Progress sampler reschedule interval in milliseconds (default: 16)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Below this many seconds into a track, "previous" steps back a
    /// position instead of restarting (default: 5)
    #[serde(default = "default_previous_restart_secs")]
    pub previous_restart_secs: u32,

    /// Ask the backend to stream resources with chunked transfer instead of
    /// buffering them whole (default: true)
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// Fixed seed for shuffle order; random when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

fn default_volume() -> f32 {
    1.0
}

fn default_crossfade_ms() -> u32 {
    1000
}

fn default_progress_interval_ms() -> u64 {
    1000
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_previous_restart_secs() -> u32 {
    5
}

fn default_stream() -> bool {
    true
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            muted: false,
            repeat: RepeatMode::Off,
            shuffle: false,
            crossfade_ms: default_crossfade_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            previous_restart_secs: default_previous_restart_secs(),
            stream: default_stream(),
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(config::Environment::with_prefix(prefix).try_parsing(true));

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        tracing::debug!(?config, "loaded playback configuration");
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::Config(format!(
                "volume must be within 0.0..=1.0, got {}",
                self.volume
            )));
        }

        if self.frame_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "frame_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.crossfade_ms > 10_000 {
            return Err(PlaybackError::Config(format!(
                "crossfade_ms must be at most 10000, got {}",
                self.crossfade_ms
            )));
        }

        Ok(())
    }

    /// Crossfade length
    pub fn crossfade(&self) -> Duration {
        Duration::from_millis(u64::from(self.crossfade_ms))
    }

    /// Minimum time between progress commits
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Progress sampler reschedule interval
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
