//! Progress sampling loop
//!
//! The sampler is rescheduled every frame but only commits a position when
//! the handle is playing and at least the configured interval has elapsed
//! since the previous commit, so the UI updates about once a second.

use crate::handle::AudioHandle;
use std::time::Duration;
use tokio::time::Instant;

/// Throttled position sampler for one track's playback
#[derive(Debug, Clone)]
pub struct ProgressSampler {
    interval: Duration,
    last_sample: Instant,
}

impl ProgressSampler {
    /// Start sampling with the elapsed-time baseline at `now`
    pub fn start(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_sample: now,
        }
    }

    /// One frame of the loop
    ///
    /// Returns the truncated whole-second position to commit, if any.
    pub fn sample(&mut self, handle: &dyn AudioHandle, now: Instant) -> Option<u32> {
        if !handle.is_playing() {
            return None;
        }
        if now.saturating_duration_since(self.last_sample) < self.interval {
            return None;
        }
        self.last_sample = now;
        Some(whole_seconds(handle.position()))
    }
}

/// Truncate a position in seconds to whole seconds, saturating at zero
pub(crate) fn whole_seconds(seconds: f64) -> u32 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
