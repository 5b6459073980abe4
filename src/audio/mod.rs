//! Audio system
//!
//! Every effect is synthesized once at startup (no sample files) and played
//! through a voice mixer. [`AudioEngine::play`] never fails: any backend
//! problem turns audio off for the rest of the process.

pub mod backend;
pub mod mixer;
pub mod patch;
pub mod synth;

use std::time::Instant;

pub use backend::{AudioBackend, AudioError, NullBackend};
#[cfg(feature = "playback")]
pub use backend::RodioBackend;
pub use mixer::{Mixer, MixerConfig, PlayOutcome};
pub use patch::{SynthPatch, Waveform};
pub use synth::{DEFAULT_SAMPLE_RATE, RenderedSound, SoundBank};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Snake changed direction
    Turn,
    /// Regular fruit eaten
    Fruit,
    /// Bonus fruit collected
    Bonus,
    /// Spawn telegraph appeared
    SpawnWarning,
    /// Telegraphed enemy became active
    EnemySpawn,
    /// Match ended
    GameOver,
    /// Grid ripple emitted (reserved voice)
    Ripple,
    /// Enemy caught by a ripple
    EnemyDestroy,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 8] = [
        SoundEffect::Turn,
        SoundEffect::Fruit,
        SoundEffect::Bonus,
        SoundEffect::SpawnWarning,
        SoundEffect::EnemySpawn,
        SoundEffect::GameOver,
        SoundEffect::Ripple,
        SoundEffect::EnemyDestroy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Turn => "turn",
            SoundEffect::Fruit => "fruit",
            SoundEffect::Bonus => "bonus",
            SoundEffect::SpawnWarning => "spawn_warning",
            SoundEffect::EnemySpawn => "enemy_spawn",
            SoundEffect::GameOver => "over",
            SoundEffect::Ripple => "ripple",
            SoundEffect::EnemyDestroy => "enemy_destroy",
        }
    }
}

/// Audio manager for the game
pub struct AudioEngine {
    mixer: Option<Mixer<Box<dyn AudioBackend>>>,
    bank: SoundBank,
    clock: Instant,
}

impl AudioEngine {
    /// Build the engine around a backend that may have failed to open
    ///
    /// Sounds are rendered only when a backend is available.
    pub fn new(
        backend: Result<Box<dyn AudioBackend>, AudioError>,
        sample_rate: u32,
        master_volume: f32,
        seed: u64,
    ) -> Self {
        match backend {
            Ok(backend) => {
                let bank = SoundBank::render_all(sample_rate, master_volume, seed);
                let voices = backend.voice_count();
                log::info!("Audio enabled: {voices} voices at {sample_rate} Hz");
                Self {
                    mixer: Some(Mixer::new(backend, MixerConfig::default())),
                    bank,
                    clock: Instant::now(),
                }
            }
            Err(err) => {
                log::warn!("Audio unavailable ({err}) - running silent");
                Self::disabled()
            }
        }
    }

    /// An engine that ignores every request
    pub fn disabled() -> Self {
        Self {
            mixer: None,
            bank: SoundBank::default(),
            clock: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mixer.as_ref().is_some_and(|m| m.is_enabled())
    }

    /// Fire-and-forget playback
    pub fn play(&mut self, effect: SoundEffect) {
        let now_ms = self.clock.elapsed().as_millis() as u64;
        self.play_at(effect, now_ms);
    }

    fn play_at(&mut self, effect: SoundEffect, now_ms: u64) -> PlayOutcome {
        let Some(mixer) = self.mixer.as_mut() else {
            return PlayOutcome::Disabled;
        };
        let Some(entry) = self.bank.get(effect) else {
            return PlayOutcome::NoVoice;
        };
        let outcome = mixer.play(effect, entry, now_ms);
        if !mixer.is_enabled() {
            self.mixer = None;
        }
        outcome
    }

    /// Per-frame housekeeping (fade-outs)
    pub fn update(&mut self) {
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.pump();
        }
    }
}
