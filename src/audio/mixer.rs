//! Voice allocation and gain shaping
//!
//! Per request: replay gate, voice choice (idle first, then steal), a
//! short-window loudness limiter and polyphony ducking. One voice is kept
//! exclusively for the reserved effect.

use std::collections::HashMap;

use super::SoundEffect;
use super::backend::{AudioBackend, AudioError};
use super::synth::BankEntry;

/// Mixer tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixerConfig {
    /// Minimum spacing between two plays of the same effect (ms)
    pub gate_ms: u64,
    /// Trailing window of the loudness limiter (ms)
    pub limiter_window_ms: u64,
    /// Summed level allowed inside the limiter window
    pub limiter_ceiling: f32,
    /// Effect bound to the last voice of the pool
    pub reserved: Option<SoundEffect>,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            gate_ms: 60,
            limiter_window_ms: 220,
            limiter_ceiling: 1.32,
            reserved: Some(SoundEffect::Ripple),
        }
    }
}

/// What happened to a play request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayOutcome {
    Played { voice: usize, volume: f32 },
    /// Same effect played inside the gate window
    Gated,
    /// No voice available (pool empty or reserved-only)
    NoVoice,
    Disabled,
}

const DUCK_DEPTH: f32 = 0.45;
const DUCK_FLOOR: f32 = 0.12;
const LIMITER_MIN_SCALE: f32 = 0.2;
const RESERVED_FADE_OUT_MIN_MS: u32 = 120;

pub struct Mixer<B: AudioBackend> {
    backend: B,
    config: MixerConfig,
    reserved_voice: Option<usize>,
    last_play: HashMap<SoundEffect, u64>,
    /// (timestamp ms, level) of recent plays
    mix_events: Vec<(u64, f32)>,
    enabled: bool,
}

impl<B: AudioBackend> Mixer<B> {
    pub fn new(backend: B, config: MixerConfig) -> Self {
        let voices = backend.voice_count();
        let reserved_voice = config.reserved.and(voices.checked_sub(1));
        Self {
            backend,
            config,
            reserved_voice,
            last_play: HashMap::new(),
            mix_events: Vec::new(),
            enabled: true,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Play `entry` for `effect` at time `now_ms`
    ///
    /// A backend failure disables the mixer for good; the caller only sees
    /// the outcome.
    pub fn play(&mut self, effect: SoundEffect, entry: &BankEntry, now_ms: u64) -> PlayOutcome {
        if !self.enabled {
            return PlayOutcome::Disabled;
        }

        if let Some(&last) = self.last_play.get(&effect) {
            if now_ms.saturating_sub(last) < self.config.gate_ms {
                log::trace!("{} gated", effect.name());
                return PlayOutcome::Gated;
            }
        }
        self.last_play.insert(effect, now_ms);

        match self.dispatch(effect, entry, now_ms) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Audio playback failed ({err}) - audio disabled");
                self.enabled = false;
                PlayOutcome::Disabled
            }
        }
    }

    fn dispatch(
        &mut self,
        effect: SoundEffect,
        entry: &BankEntry,
        now_ms: u64,
    ) -> Result<PlayOutcome, AudioError> {
        let voice = if self.config.reserved == Some(effect) {
            let Some(voice) = self.reserved_voice else {
                return Ok(PlayOutcome::NoVoice);
            };
            if self.backend.is_busy(voice) {
                self.backend
                    .fade_out(voice, entry.fade_ms.max(RESERVED_FADE_OUT_MIN_MS));
            }
            voice
        } else {
            match self.find_voice() {
                Some(voice) => voice,
                None => {
                    log::trace!("{} dropped: no voice", effect.name());
                    return Ok(PlayOutcome::NoVoice);
                }
            }
        };

        let limited = self.limit_volume(entry.mix_volume, now_ms);
        let volume = self.dynamic_volume(limited);
        self.backend
            .play(voice, &entry.sound, volume, entry.fade_ms)?;
        Ok(PlayOutcome::Played { voice, volume })
    }

    /// First idle non-reserved voice, else steal the first non-reserved one
    fn find_voice(&mut self) -> Option<usize> {
        let reserved = self.reserved_voice;
        let candidates = || (0..self.backend.voice_count()).filter(move |&v| Some(v) != reserved);

        if let Some(voice) = candidates().find(|&v| !self.backend.is_busy(v)) {
            return Some(voice);
        }
        let voice = candidates().next()?;
        log::trace!("Stealing voice {voice}");
        self.backend.stop(voice);
        Some(voice)
    }

    /// Duck the level as more voices are busy
    fn dynamic_volume(&self, base: f32) -> f32 {
        let voices = self.backend.voice_count();
        if voices == 0 {
            return base.clamp(0.0, 1.0);
        }
        let busy = (0..voices).filter(|&v| self.backend.is_busy(v)).count();
        let ratio = busy as f32 / voices as f32;
        let scale = 1.0 - DUCK_DEPTH * ratio;
        (base * scale).clamp(DUCK_FLOOR, 1.0)
    }

    /// Scale a new level down if the recent window is already loud
    fn limit_volume(&mut self, base: f32, now_ms: u64) -> f32 {
        let window = self.config.limiter_window_ms;
        self.mix_events
            .retain(|&(ts, _)| now_ms.saturating_sub(ts) < window);

        let projected: f32 = self.mix_events.iter().map(|&(_, level)| level).sum::<f32>() + base;
        let level = if projected <= self.config.limiter_ceiling {
            base
        } else {
            let scale = (self.config.limiter_ceiling / projected.max(1e-5)).max(LIMITER_MIN_SCALE);
            base * scale
        };
        self.mix_events.push((now_ms, level));
        level
    }

    pub fn pump(&mut self) {
        if self.enabled {
            self.backend.pump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::synth::RenderedSound;

    /// In-memory backend recording every call
    #[derive(Debug, Default)]
    struct RecordingBackend {
        busy: Vec<bool>,
        plays: Vec<(usize, f32)>,
        stops: Vec<usize>,
        fades: Vec<(usize, u32)>,
        fail_next: bool,
    }

    impl RecordingBackend {
        fn new(voices: usize) -> Self {
            Self {
                busy: vec![false; voices],
                ..Default::default()
            }
        }
    }

    impl AudioBackend for RecordingBackend {
        fn voice_count(&self) -> usize {
            self.busy.len()
        }

        fn is_busy(&self, voice: usize) -> bool {
            self.busy.get(voice).copied().unwrap_or(false)
        }

        fn play(
            &mut self,
            voice: usize,
            _sound: &RenderedSound,
            volume: f32,
            _fade_in_ms: u32,
        ) -> Result<(), AudioError> {
            if self.fail_next {
                return Err(AudioError::Playback("device lost".into()));
            }
            self.plays.push((voice, volume));
            self.busy[voice] = true;
            Ok(())
        }

        fn stop(&mut self, voice: usize) {
            self.stops.push(voice);
            self.busy[voice] = false;
        }

        fn fade_out(&mut self, voice: usize, fade_ms: u32) {
            self.fades.push((voice, fade_ms));
        }
    }

    fn entry(mix_volume: f32, fade_ms: u32) -> BankEntry {
        BankEntry {
            sound: RenderedSound {
                samples: vec![0; 16],
                sample_rate: 8_000,
            },
            fade_ms,
            mix_volume,
        }
    }

    #[test]
    fn test_reserved_voice_only_pool_plays_once_inside_gate() {
        let mut mixer = Mixer::new(RecordingBackend::new(1), MixerConfig::default());
        let ripple = entry(0.3, 22);

        let first = mixer.play(SoundEffect::Ripple, &ripple, 1_000);
        let second = mixer.play(SoundEffect::Ripple, &ripple, 1_030);

        assert!(matches!(first, PlayOutcome::Played { voice: 0, .. }));
        assert_eq!(second, PlayOutcome::Gated);
        assert_eq!(mixer.backend().plays.len(), 1);
    }

    #[test]
    fn test_reserved_only_pool_rejects_other_effects() {
        let mut mixer = Mixer::new(RecordingBackend::new(1), MixerConfig::default());
        let outcome = mixer.play(SoundEffect::Fruit, &entry(0.34, 9), 0);
        assert_eq!(outcome, PlayOutcome::NoVoice);
        assert!(mixer.backend().plays.is_empty());
    }

    #[test]
    fn test_first_play_at_time_zero_is_not_gated() {
        let mut mixer = Mixer::new(RecordingBackend::new(4), MixerConfig::default());
        let outcome = mixer.play(SoundEffect::Turn, &entry(0.28, 6), 0);
        assert!(matches!(outcome, PlayOutcome::Played { .. }));
    }

    #[test]
    fn test_gate_reopens_after_window() {
        let mut mixer = Mixer::new(RecordingBackend::new(4), MixerConfig::default());
        let turn = entry(0.28, 6);
        mixer.play(SoundEffect::Turn, &turn, 100);
        assert_eq!(mixer.play(SoundEffect::Turn, &turn, 159), PlayOutcome::Gated);
        assert!(matches!(
            mixer.play(SoundEffect::Turn, &turn, 160),
            PlayOutcome::Played { .. }
        ));
    }

    #[test]
    fn test_busy_reserved_voice_fades_before_restart() {
        let mut mixer = Mixer::new(RecordingBackend::new(3), MixerConfig::default());
        let ripple = entry(0.3, 22);
        mixer.play(SoundEffect::Ripple, &ripple, 0);
        mixer.play(SoundEffect::Ripple, &ripple, 500);

        let backend = mixer.backend();
        assert_eq!(backend.plays.iter().filter(|(v, _)| *v == 2).count(), 2);
        assert_eq!(backend.fades, vec![(2, 120)]);
        assert!(backend.stops.is_empty());
    }

    #[test]
    fn test_idle_voices_preferred_then_first_non_reserved_stolen() {
        let mut mixer = Mixer::new(RecordingBackend::new(3), MixerConfig::default());
        mixer.play(SoundEffect::Turn, &entry(0.1, 0), 0);
        mixer.play(SoundEffect::Fruit, &entry(0.1, 0), 0);
        mixer.play(SoundEffect::Bonus, &entry(0.1, 0), 0);

        let backend = mixer.backend();
        let voices: Vec<usize> = backend.plays.iter().map(|(v, _)| *v).collect();
        assert_eq!(voices, vec![0, 1, 0]);
        assert_eq!(backend.stops, vec![0]);
    }

    #[test]
    fn test_ducking_scales_with_busy_ratio() {
        let mut backend = RecordingBackend::new(4);
        backend.busy = vec![true, true, false, false];
        let mut mixer = Mixer::new(backend, MixerConfig::default());

        let outcome = mixer.play(SoundEffect::Fruit, &entry(0.4, 0), 0);
        let PlayOutcome::Played { volume, .. } = outcome else {
            panic!("expected play, got {outcome:?}");
        };
        assert!((volume - 0.4 * (1.0 - 0.45 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_ducking_floor() {
        let mut mixer = Mixer::new(RecordingBackend::new(4), MixerConfig::default());
        let outcome = mixer.play(SoundEffect::Fruit, &entry(0.01, 0), 0);
        assert!(matches!(outcome, PlayOutcome::Played { volume, .. } if (volume - 0.12).abs() < 1e-6));
    }

    #[test]
    fn test_limiter_scales_crowded_window() {
        let config = MixerConfig {
            reserved: None,
            ..MixerConfig::default()
        };
        let mut mixer = Mixer::new(RecordingBackend::new(24), config);

        assert_eq!(mixer.limit_volume(0.6, 0), 0.6);
        assert_eq!(mixer.limit_volume(0.6, 10), 0.6);
        // 1.2 already in window, 1.8 projected
        let third = mixer.limit_volume(0.6, 20);
        assert!((third - 0.6 * (1.32 / 1.8)).abs() < 1e-5);
        // Outside the window everything is forgotten
        assert_eq!(mixer.limit_volume(0.6, 400), 0.6);
    }

    #[test]
    fn test_limiter_scale_floor() {
        let mut mixer = Mixer::new(RecordingBackend::new(2), MixerConfig::default());
        for i in 0..20 {
            mixer.limit_volume(1.0, i);
        }
        let level = mixer.limit_volume(1.0, 21);
        assert!((level - LIMITER_MIN_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_backend_failure_disables_mixer() {
        let mut backend = RecordingBackend::new(4);
        backend.fail_next = true;
        let mut mixer = Mixer::new(backend, MixerConfig::default());

        assert_eq!(
            mixer.play(SoundEffect::Fruit, &entry(0.3, 0), 0),
            PlayOutcome::Disabled
        );
        assert!(!mixer.is_enabled());
        assert_eq!(
            mixer.play(SoundEffect::Bonus, &entry(0.3, 0), 1_000),
            PlayOutcome::Disabled
        );
    }
}
