//! Synth patches: the parameter set behind every sound effect

use super::SoundEffect;

/// Oscillator shape used for every harmonic of a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    /// Pulse wave; duty cycle comes from `SynthPatch::pulse_width`
    #[default]
    Square,
    Triangle,
}

/// Immutable parameter set for one sound effect
///
/// ADSR stage lengths are fractions of the total duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthPatch {
    /// Base frequency (Hz)
    pub freq: f32,
    pub duration_ms: u32,
    /// (frequency multiplier, weight) pairs summed into the composite wave
    pub harmonics: &'static [(f32, f32)],
    /// Frequency change across the whole duration (Hz)
    pub sweep: f32,
    /// Uniform noise weight
    pub noise: f32,
    pub attack: f32,
    pub decay: f32,
    pub release: f32,
    pub sustain_level: f32,
    /// Vibrato rate (Hz), 0 disables
    pub vibrato_rate: f32,
    /// Vibrato depth (Hz)
    pub vibrato_depth: f32,
    /// Output level after peak normalisation
    pub volume: f32,
    pub waveform: Waveform,
    /// Quantization levels, 0 disables the bitcrush
    pub bitcrush_levels: u32,
    /// Fade-in applied on playback (ms)
    pub fade_ms: u32,
    /// Base channel level handed to the mixer
    pub mix_volume: f32,
    /// Square-wave duty cycle, clamped to [0.05, 0.95] when rendering
    pub pulse_width: f32,
}

impl Default for SynthPatch {
    fn default() -> Self {
        Self {
            freq: 440.0,
            duration_ms: 100,
            harmonics: &[(1.0, 1.0)],
            sweep: 0.0,
            noise: 0.0,
            attack: 0.02,
            decay: 0.15,
            release: 0.2,
            sustain_level: 0.6,
            vibrato_rate: 0.0,
            vibrato_depth: 0.0,
            volume: 0.5,
            waveform: Waveform::Square,
            bitcrush_levels: 0,
            fade_ms: 18,
            mix_volume: 0.4,
            pulse_width: 0.5,
        }
    }
}

impl SoundEffect {
    /// Chiptune patch for this effect
    pub fn patch(self) -> SynthPatch {
        match self {
            SoundEffect::Turn => SynthPatch {
                freq: 340.0,
                duration_ms: 90,
                harmonics: &[(1.0, 1.0), (2.0, 0.2)],
                sweep: -180.0,
                attack: 0.001,
                decay: 0.05,
                release: 0.05,
                sustain_level: 0.16,
                vibrato_rate: 5.5,
                vibrato_depth: 3.0,
                noise: 0.04,
                volume: 0.75,
                bitcrush_levels: 5,
                fade_ms: 6,
                mix_volume: 0.28,
                pulse_width: 0.24,
                ..Default::default()
            },
            SoundEffect::Fruit => SynthPatch {
                freq: 380.0,
                duration_ms: 140,
                harmonics: &[(1.0, 1.0), (2.0, 0.3), (3.0, 0.15)],
                sweep: 120.0,
                attack: 0.001,
                decay: 0.09,
                release: 0.09,
                sustain_level: 0.25,
                vibrato_rate: 3.5,
                vibrato_depth: 2.0,
                noise: 0.06,
                volume: 0.82,
                bitcrush_levels: 4,
                fade_ms: 9,
                mix_volume: 0.34,
                pulse_width: 0.35,
                ..Default::default()
            },
            SoundEffect::Bonus => SynthPatch {
                freq: 300.0,
                duration_ms: 420,
                harmonics: &[(0.5, 0.4), (1.0, 1.0), (1.5, 0.45)],
                sweep: 140.0,
                attack: 0.003,
                decay: 0.2,
                release: 0.4,
                sustain_level: 0.48,
                vibrato_rate: 3.0,
                vibrato_depth: 4.5,
                noise: 0.15,
                volume: 0.92,
                bitcrush_levels: 4,
                fade_ms: 18,
                mix_volume: 0.31,
                pulse_width: 0.4,
                ..Default::default()
            },
            SoundEffect::SpawnWarning => SynthPatch {
                freq: 260.0,
                duration_ms: 160,
                sweep: -40.0,
                attack: 0.001,
                decay: 0.08,
                release: 0.08,
                sustain_level: 0.2,
                vibrato_rate: 2.2,
                vibrato_depth: 2.5,
                noise: 0.15,
                volume: 0.7,
                bitcrush_levels: 4,
                fade_ms: 6,
                mix_volume: 0.3,
                pulse_width: 0.28,
                ..Default::default()
            },
            SoundEffect::EnemySpawn => SynthPatch {
                freq: 210.0,
                duration_ms: 190,
                harmonics: &[(0.5, 0.7), (1.0, 1.0)],
                sweep: 90.0,
                attack: 0.001,
                decay: 0.12,
                release: 0.15,
                sustain_level: 0.22,
                vibrato_rate: 2.0,
                vibrato_depth: 2.0,
                noise: 0.3,
                volume: 0.85,
                bitcrush_levels: 3,
                fade_ms: 10,
                mix_volume: 0.32,
                pulse_width: 0.3,
                ..Default::default()
            },
            SoundEffect::GameOver => SynthPatch {
                freq: 150.0,
                duration_ms: 520,
                harmonics: &[(0.5, 1.0), (1.0, 0.6)],
                sweep: -320.0,
                noise: 0.45,
                attack: 0.004,
                decay: 0.28,
                release: 0.55,
                sustain_level: 0.42,
                vibrato_rate: 2.2,
                vibrato_depth: 3.5,
                volume: 0.7,
                bitcrush_levels: 4,
                fade_ms: 32,
                mix_volume: 0.32,
                ..Default::default()
            },
            SoundEffect::Ripple => SynthPatch {
                freq: 190.0,
                duration_ms: 360,
                harmonics: &[(0.5, 0.7), (1.0, 1.0)],
                sweep: -80.0,
                attack: 0.006,
                decay: 0.2,
                release: 0.35,
                sustain_level: 0.48,
                vibrato_rate: 2.4,
                vibrato_depth: 3.5,
                noise: 0.15,
                volume: 0.8,
                bitcrush_levels: 5,
                fade_ms: 22,
                mix_volume: 0.3,
                pulse_width: 0.46,
                ..Default::default()
            },
            SoundEffect::EnemyDestroy => SynthPatch {
                freq: 170.0,
                duration_ms: 200,
                harmonics: &[(0.5, 0.9), (1.0, 0.7)],
                sweep: 110.0,
                noise: 0.6,
                attack: 0.0,
                decay: 0.12,
                release: 0.2,
                sustain_level: 0.32,
                volume: 0.8,
                bitcrush_levels: 3,
                fade_ms: 12,
                mix_volume: 0.29,
                ..Default::default()
            },
        }
    }
}
