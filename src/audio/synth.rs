//! Procedural synthesizer
//!
//! Renders a [`SynthPatch`] into a fixed-length mono buffer: additive
//! harmonics with sweep and vibrato, uniform noise, a 4-stage envelope and an
//! optional bitcrush, then peak-normalised into 16-bit samples.
//!
//! Noise is the only random input. It is drawn from the caller's RNG so a
//! seeded generator gives bit-identical buffers.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::SoundEffect;
use super::patch::{SynthPatch, Waveform};

/// Default output rate for rendered effects
pub const DEFAULT_SAMPLE_RATE: u32 = 32_000;

/// A rendered effect: 16-bit mono samples at a fixed rate
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSound {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl RenderedSound {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}

/// Sample boundaries of the envelope stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EnvelopeBounds {
    attack: usize,
    decay: usize,
    release: usize,
    sustain_start: usize,
    sustain_end: usize,
}

impl EnvelopeBounds {
    fn new(patch: &SynthPatch, sample_count: usize) -> Self {
        let n = sample_count as f64;
        let attack = (n * patch.attack.max(0.0) as f64) as usize;
        let decay = (n * patch.decay.max(0.0) as f64) as usize;
        let release = (n * patch.release.max(0.0) as f64) as usize;
        let sustain_start = sample_count.min(attack + decay);
        let sustain_end = sustain_start.max(sample_count.saturating_sub(release));
        Self {
            attack,
            decay,
            release,
            sustain_start,
            sustain_end,
        }
    }

    /// Envelope level at sample `idx`, never negative
    fn level(&self, idx: usize, sustain: f64) -> f64 {
        let env = if self.attack > 0 && idx < self.attack {
            idx as f64 / self.attack as f64
        } else if self.decay > 0 && idx < self.sustain_start {
            1.0 - (1.0 - sustain) * ((idx - self.attack) as f64 / self.decay as f64)
        } else if idx < self.sustain_end {
            sustain
        } else if self.release > 0 {
            sustain * (1.0 - (idx - self.sustain_end) as f64 / self.release.max(1) as f64)
        } else {
            0.0
        };
        env.max(0.0)
    }
}

fn oscillator(waveform: Waveform, freq: f64, t: f64, pulse_width: f64) -> f64 {
    let cycle_pos = (freq * t).rem_euclid(1.0);
    match waveform {
        Waveform::Square => {
            if cycle_pos < pulse_width {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 4.0 * (cycle_pos - 0.5).abs() - 1.0,
        Waveform::Sine => (TAU * freq * t).sin(),
    }
}

/// Render the enveloped (and bitcrushed) waveform before output scaling
///
/// The composite is divided by the total harmonic + noise weight so every
/// value lies in [-1, 1]; with `bitcrush_levels = L > 0` each value is
/// exactly `k / L` for an integer `k` in `[-L, L]`.
pub fn render_levels<R: Rng + ?Sized>(
    patch: &SynthPatch,
    sample_rate: u32,
    noise: &mut R,
) -> Vec<f32> {
    let rate = sample_rate.max(1) as f64;
    let sample_count = ((sample_rate as u64 * patch.duration_ms as u64) / 1000).max(1) as usize;
    let bounds = EnvelopeBounds::new(patch, sample_count);
    let sustain = patch.sustain_level.clamp(0.0, 1.0) as f64;
    let pulse = (patch.pulse_width as f64).clamp(0.05, 0.95);
    let noise_weight = patch.noise.max(0.0) as f64;

    let total_weight: f64 =
        patch.harmonics.iter().map(|&(_, w)| (w as f64).abs()).sum::<f64>() + noise_weight;
    let weight_scale = if total_weight > 0.0 { 1.0 / total_weight } else { 1.0 };

    let vibrato = patch.vibrato_rate > 0.0 && patch.vibrato_depth != 0.0;
    let levels = patch.bitcrush_levels as f64;

    let mut out = Vec::with_capacity(sample_count);
    for idx in 0..sample_count {
        let t = idx as f64 / rate;
        let progress = idx as f64 / sample_count as f64;
        let mut freq = patch.freq as f64 + patch.sweep as f64 * progress;
        if vibrato {
            freq += (TAU * patch.vibrato_rate as f64 * t).sin() * patch.vibrato_depth as f64;
        }

        let mut value: f64 = patch
            .harmonics
            .iter()
            .map(|&(mult, weight)| {
                weight as f64 * oscillator(patch.waveform, freq * mult as f64, t, pulse)
            })
            .sum();

        if noise_weight > 0.0 {
            value += noise_weight * (noise.random::<f64>() * 2.0 - 1.0);
        }

        let mut v = value * weight_scale * bounds.level(idx, sustain);

        if patch.bitcrush_levels > 0 {
            v = (v * levels).round() / levels;
        }

        out.push(v as f32);
    }
    out
}

/// Render a patch into 16-bit samples
///
/// Peak-normalises the levels, then scales by `patch.volume * master_volume`.
pub fn render<R: Rng + ?Sized>(
    patch: &SynthPatch,
    sample_rate: u32,
    master_volume: f32,
    noise: &mut R,
) -> RenderedSound {
    let levels = render_levels(patch, sample_rate, noise);

    let mut peak = levels.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    if peak <= 0.0 {
        peak = 1.0;
    }
    let scale = 32767.0 * (patch.volume * master_volume) / peak;

    let samples = levels
        .iter()
        .map(|v| (v * scale).clamp(-32767.0, 32767.0) as i16)
        .collect();

    RenderedSound {
        samples,
        sample_rate,
    }
}

/// A rendered effect plus the playback parameters the mixer needs
#[derive(Debug, Clone)]
pub struct BankEntry {
    pub sound: RenderedSound,
    pub fade_ms: u32,
    pub mix_volume: f32,
}

/// Every effect rendered once at startup, cached for the process lifetime
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    entries: HashMap<SoundEffect, BankEntry>,
}

/// Per-effect noise seed so each render thread owns an independent stream
fn noise_seed(bank_seed: u64, effect: SoundEffect) -> u64 {
    bank_seed ^ (effect as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl SoundBank {
    /// Render every effect in parallel; all renders are joined before return
    pub fn render_all(sample_rate: u32, master_volume: f32, seed: u64) -> Self {
        let rendered: Vec<(SoundEffect, BankEntry)> = std::thread::scope(|scope| {
            let handles: Vec<_> = SoundEffect::ALL
                .iter()
                .map(|&effect| {
                    scope.spawn(move || {
                        let patch = effect.patch();
                        let mut rng = Pcg32::seed_from_u64(noise_seed(seed, effect));
                        let sound = render(&patch, sample_rate, master_volume, &mut rng);
                        (
                            effect,
                            BankEntry {
                                sound,
                                fade_ms: patch.fade_ms,
                                mix_volume: patch.mix_volume,
                            },
                        )
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| match handle.join() {
                    Ok(entry) => Some(entry),
                    Err(_) => {
                        log::warn!("Sound render thread panicked; effect left silent");
                        None
                    }
                })
                .collect()
        });

        log::info!(
            "Rendered {} sound effects at {} Hz",
            rendered.len(),
            sample_rate
        );

        Self {
            entries: rendered.into_iter().collect(),
        }
    }

    pub fn get(&self, effect: SoundEffect) -> Option<&BankEntry> {
        self.entries.get(&effect)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    #[test]
    fn test_sample_count_matches_duration() {
        let patch = SoundEffect::Fruit.patch();
        let levels = render_levels(&patch, 32_000, &mut seeded(1));
        assert_eq!(levels.len(), 32_000 * 140 / 1000);
    }

    #[test]
    fn test_render_is_deterministic_for_same_noise_seed() {
        for effect in SoundEffect::ALL {
            let patch = effect.patch();
            let a = render(&patch, 32_000, 0.45, &mut seeded(7));
            let b = render(&patch, 32_000, 0.45, &mut seeded(7));
            assert_eq!(a, b, "{effect:?}");
        }
    }

    #[test]
    fn test_noise_stream_changes_output() {
        let patch = SoundEffect::EnemyDestroy.patch();
        let a = render(&patch, 32_000, 0.45, &mut seeded(1));
        let b = render(&patch, 32_000, 0.45, &mut seeded(2));
        assert_ne!(a.samples, b.samples);
    }

    #[test]
    fn test_peak_matches_volume() {
        let patch = SynthPatch {
            waveform: Waveform::Sine,
            noise: 0.0,
            ..SoundEffect::Bonus.patch()
        };
        let sound = render(&patch, 32_000, 1.0, &mut seeded(3));
        let peak = sound.samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        let expected = (32767.0 * patch.volume) as u16;
        assert!(peak.abs_diff(expected) <= 1, "peak {peak} expected {expected}");
    }

    #[test]
    fn test_envelope_starts_at_zero_and_ends_quiet() {
        let patch = SynthPatch {
            attack: 0.1,
            decay: 0.1,
            release: 0.2,
            bitcrush_levels: 0,
            noise: 0.0,
            ..SynthPatch::default()
        };
        let levels = render_levels(&patch, 8_000, &mut seeded(0));
        assert_eq!(levels[0], 0.0);
        let tail = levels[levels.len() - 1].abs();
        assert!(tail < 0.05, "tail {tail}");
    }

    #[test]
    fn test_silent_patch_does_not_divide_by_zero() {
        let patch = SynthPatch {
            harmonics: &[(1.0, 0.0)],
            noise: 0.0,
            ..SynthPatch::default()
        };
        let sound = render(&patch, 8_000, 1.0, &mut seeded(0));
        assert!(sound.samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_bank_renders_every_effect() {
        let bank = SoundBank::render_all(8_000, 0.45, 99);
        assert_eq!(bank.len(), SoundEffect::ALL.len());
        let ripple = bank.get(SoundEffect::Ripple).expect("ripple rendered");
        assert_eq!(ripple.fade_ms, 22);
        assert_eq!(ripple.sound.duration_ms(), 360);
    }

    #[test]
    fn test_bank_is_reproducible() {
        let a = SoundBank::render_all(8_000, 0.45, 5);
        let b = SoundBank::render_all(8_000, 0.45, 5);
        for effect in SoundEffect::ALL {
            assert_eq!(
                a.get(effect).map(|e| &e.sound),
                b.get(effect).map(|e| &e.sound)
            );
        }
    }

    proptest! {
        #[test]
        fn prop_bitcrush_values_sit_on_the_grid(
            levels in 1u32..12,
            freq in 60.0f32..900.0,
            sweep in -300.0f32..300.0,
            noise in 0.0f32..0.8,
            seed in any::<u64>(),
        ) {
            let patch = SynthPatch {
                freq,
                sweep,
                noise,
                duration_ms: 40,
                bitcrush_levels: levels,
                harmonics: &[(0.5, 0.7), (1.0, 1.0), (2.0, 0.3)],
                ..SynthPatch::default()
            };
            let l = levels as f64;
            for v in render_levels(&patch, 8_000, &mut seeded(seed)) {
                let k = (v as f64 * l).round();
                prop_assert!((v as f64 * l - k).abs() < 1e-4, "{} not on grid", v);
                prop_assert!(k.abs() <= l);
            }
        }
    }
}
