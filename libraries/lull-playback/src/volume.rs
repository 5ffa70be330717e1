//! Volume and mute state
//!
//! The engine works with linear volume in `0.0..=1.0`; the audio backend is
//! responsible for any perceptual curve.

/// Volume level with an independent mute flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Linear level in 0.0..=1.0
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume state, clamping the level
    pub fn new(level: f32, muted: bool) -> Self {
        let mut volume = Self { level: 1.0, muted };
        volume.set_level(level);
        volume
    }

    /// Set volume level
    ///
    /// Values are clamped to 0.0..=1.0. NaN is ignored and returns `false`.
    pub fn set_level(&mut self, level: f32) -> bool {
        if level.is_nan() {
            return false;
        }
        self.level = level.clamp(0.0, 1.0);
        true
    }

    /// Current level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Set mute state
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}
