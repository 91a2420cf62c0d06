//! Game settings and preferences
//!
//! Held in memory for the session only.

use serde::{Deserialize, Serialize};

use crate::ai::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Opponent skill
    pub difficulty: Difficulty,

    // === Audio ===
    /// Volume slider (0 - 100)
    pub volume: u8,

    // === Visual Effects ===
    /// Ball trails
    pub trails: bool,
    /// Screen shake on impacts
    pub screen_shake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            volume: 70,
            trails: true,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse settings, falling back to `None` (and a warning) on bad input
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.volume = settings.volume.min(100);
                Some(settings)
            }
            Err(e) => {
                log::warn!("Ignoring invalid settings: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Set the volume slider, clamped to 0 - 100
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    /// Volume as a gain factor (0.0 - 1.0)
    pub fn volume_fraction(&self) -> f32 {
        self.volume.min(100) as f32 / 100.0
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }
}
