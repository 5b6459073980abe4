//! Game settings and preferences
//!
//! Persisted as JSON next to the high score. Missing fields take their
//! defaults so older files keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::persistence::{self, PersistenceError};
use crate::sim::{EffectToggle, EffectToggles};

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual effects ===
    pub effects: EffectToggles,
    /// Every effect switched off at once
    pub performance_mode: bool,
    pub fullscreen: bool,

    // === Audio ===
    pub audio_enabled: bool,
    /// Master sound effect volume (0.0 - 1.0)
    pub master_sfx_volume: f32,
    /// Simultaneous voices, the last one reserved for ripples
    pub voice_count: usize,
    pub sample_rate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            effects: EffectToggles::default(),
            performance_mode: false,
            fullscreen: false,

            audio_enabled: true,
            master_sfx_volume: 0.45,
            voice_count: 24,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Settings {
    /// Load settings; unreadable files give defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(PersistenceError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged and otherwise ignored
    pub fn save(&self, path: &Path) {
        match self.try_save(path) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }

    fn try_load(path: &Path) -> Result<Self, PersistenceError> {
        let json = persistence::read_text(path)?;
        serde_json::from_str(&json).map_err(|e| PersistenceError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn try_save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        persistence::write_text(path, &json)
    }

    /// Clamp hand-edited values into workable ranges
    fn sanitized(mut self) -> Self {
        if !self.master_sfx_volume.is_finite() {
            self.master_sfx_volume = Self::default().master_sfx_volume;
        }
        self.master_sfx_volume = self.master_sfx_volume.clamp(0.0, 1.0);
        self.voice_count = self.voice_count.clamp(2, 64);
        self.sample_rate = self.sample_rate.clamp(8_000, 96_000);
        self
    }

    /// Flip one effect; returns the new value
    pub fn toggle_effect(&mut self, toggle: EffectToggle) -> bool {
        self.effects.toggle(toggle)
    }

    /// Enter or leave performance mode
    ///
    /// Entering switches every effect off; leaving switches them all back on.
    pub fn toggle_performance_mode(&mut self) -> bool {
        self.performance_mode = !self.performance_mode;
        self.effects = EffectToggles::all(!self.performance_mode);
        self.performance_mode
    }
}
