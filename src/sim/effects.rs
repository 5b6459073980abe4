//! Time-decayed visual effect pools
//!
//! Particles, trail blobs, grid ripples, snake washes and screen shake. Every
//! update function is a no-op for `dt <= 0`, so a paused frame can pass 0.
//! Ripples double as a gameplay hazard (see `collision::ripple_band_hit`).

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::consts::*;

/// Burst directions (axes and diagonals)
pub const PARTICLE_DIRECTIONS: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(0.7, 0.7),
    Vec2::new(-0.7, 0.7),
    Vec2::new(0.7, -0.7),
    Vec2::new(-0.7, -0.7),
];

/// Particles in a pickup burst
pub const BURST_COUNT: usize = 22;
/// Sparks per snake step
pub const HEAD_SPARK_COUNT: usize = 3;

/// Particle variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Chunky burst particle from pickups and explosions
    Burst,
    /// Small spark thrown ahead of the snake head
    HeadSpark,
}

/// A visual particle (not gameplay-affecting)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime (seconds)
    pub life: f32,
    pub size: f32,
    pub color: Rgb,
    pub kind: ParticleKind,
}

impl Particle {
    /// Remaining life as a fraction of the full burst lifetime
    pub fn life_ratio(&self) -> f32 {
        (self.life / PARTICLE_LIFE).clamp(0.0, 1.0)
    }
}

fn cap_particles(particles: &mut Vec<Particle>) {
    if particles.len() > MAX_PARTICLES {
        let excess = particles.len() - MAX_PARTICLES;
        particles.drain(..excess);
    }
}

/// Emit a burst of `count` particles from `center` in random palette colours
pub fn spawn_particles<R: Rng + ?Sized>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    center: Vec2,
    colors: &[Rgb],
    count: usize,
) {
    for _ in 0..count {
        let dir = PARTICLE_DIRECTIONS[rng.random_range(0..PARTICLE_DIRECTIONS.len())];
        let speed: f32 = rng.random_range(80.0..210.0);
        let size: f32 = rng.random_range(3.0..7.0);
        let color = colors.choose(rng).copied().unwrap_or(crate::color::palette::TEXT);
        particles.push(Particle {
            pos: center,
            vel: dir * speed,
            life: PARTICLE_LIFE,
            size,
            color,
            kind: ParticleKind::Burst,
        });
    }
    cap_particles(particles);
}

/// Emit sparks along `direction` with a little angular jitter
pub fn spawn_head_sparks<R: Rng + ?Sized>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    center: Vec2,
    direction: Vec2,
    color: Rgb,
    count: usize,
) {
    let color = color.brighten(40);
    for _ in 0..count {
        let jitter = Vec2::new(rng.random_range(-0.4..0.4), rng.random_range(-0.4..0.4));
        let dir = (direction + jitter).try_normalize().unwrap_or(direction);
        let speed: f32 = rng.random_range(90.0..170.0);
        particles.push(Particle {
            pos: center,
            vel: dir * speed,
            life: rng.random_range(0.12..0.2),
            size: rng.random_range(2.0..3.0),
            color,
            kind: ParticleKind::HeadSpark,
        });
    }
    cap_particles(particles);
}

pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for p in particles.iter_mut() {
        p.pos += p.vel * dt;
        p.life = (p.life - dt).max(0.0);
    }
    particles.retain(|p| p.life > 0.0);
}

/// Fading glow left where the head has been
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailBlob {
    /// Top-left pixel of the cell
    pub pos: Vec2,
    pub life: f32,
}

impl TrailBlob {
    pub fn life_ratio(&self) -> f32 {
        (self.life / TRAIL_LIFE).clamp(0.0, 1.0)
    }
}

pub fn leave_trail(trail: &mut VecDeque<TrailBlob>, pos: IVec2) {
    trail.push_back(TrailBlob {
        pos: pos.as_vec2(),
        life: TRAIL_LIFE,
    });
    while trail.len() > MAX_TRAIL {
        trail.pop_front();
    }
}

pub fn update_trail(trail: &mut VecDeque<TrailBlob>, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for blob in trail.iter_mut() {
        blob.life = (blob.life - dt).max(0.0);
    }
    trail.retain(|blob| blob.life > 0.0);
}

/// Shape of a ripple at emission time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleParams {
    pub duration: f32,
    /// Final radius in grid cells
    pub radius_cells: f32,
    /// Half-width of the active band in grid cells
    pub band_width: f32,
    pub intensity: f32,
}

/// Ripple from a regular fruit
pub const FRUIT_RIPPLE: RippleParams = RippleParams {
    duration: 1.2,
    radius_cells: GRID_CELLS as f32 * 0.55,
    band_width: 0.8,
    intensity: 0.55,
};

/// Main ripple from a bonus pickup
pub const BONUS_RIPPLE: RippleParams = RippleParams {
    duration: 1.6,
    radius_cells: GRID_CELLS as f32 * 0.9,
    band_width: 1.4,
    intensity: 0.9,
};

/// Faster white echo following a bonus ripple
pub const BONUS_ECHO_RIPPLE: RippleParams = RippleParams {
    duration: 1.0,
    radius_cells: GRID_CELLS as f32 * 0.6,
    band_width: 0.9,
    intensity: 0.5,
};

/// Expanding annular band over the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRipple {
    /// Origin in pixels
    pub origin: Vec2,
    pub duration: f32,
    /// Remaining time; counts down from `duration`
    pub timer: f32,
    /// Radius at expiry, in grid cells
    pub max_radius: f32,
    pub band_width: f32,
    pub intensity: f32,
    pub color: Rgb,
}

impl GridRipple {
    pub fn new(origin: Vec2, color: Rgb, params: RippleParams) -> Self {
        Self {
            origin,
            duration: params.duration,
            timer: params.duration,
            max_radius: params.radius_cells,
            band_width: params.band_width,
            intensity: params.intensity,
            color,
        }
    }

    /// Elapsed fraction, 0 at emission
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        1.0 - self.timer / self.duration
    }

    /// Current radius in grid cells
    pub fn radius(&self) -> f32 {
        (self.max_radius * self.progress()).max(0.0)
    }

    /// Remaining fraction, used to fade the tint
    pub fn fade(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.timer / self.duration
    }

    /// Distance (cells) from the band centre line to a pixel position
    pub fn band_distance(&self, point: Vec2) -> f32 {
        (crate::distance_in_cells(point, self.origin) - self.radius()).abs()
    }
}

pub fn update_ripples(ripples: &mut Vec<GridRipple>, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for ripple in ripples.iter_mut() {
        ripple.timer = (ripple.timer - dt).max(0.0);
    }
    ripples.retain(|r| r.timer > 0.0);
}

/// Colour band travelling head to tail along the body indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnakeWash {
    pub color: Rgb,
    /// Band centre in segment-index space; starts at `-width`
    pub progress: f32,
    /// Segments per second
    pub speed: f32,
    pub width: f32,
}

pub fn start_wash(washes: &mut Vec<SnakeWash>, color: Rgb, speed: f32, width: f32) {
    washes.push(SnakeWash {
        color,
        progress: -width,
        speed,
        width,
    });
}

/// Advance washes; retire those whose trailing edge passed `max_index`
pub fn update_washes(washes: &mut Vec<SnakeWash>, dt: f32, max_index: usize) {
    if dt <= 0.0 {
        return;
    }
    for wash in washes.iter_mut() {
        wash.progress += wash.speed * dt;
    }
    washes.retain(|w| w.progress - w.width <= max_index as f32);
}

/// Colour of segment `idx` after every overlapping wash is blended in
pub fn segment_color(idx: usize, base: Rgb, washes: &[SnakeWash]) -> Rgb {
    let (mut r, mut g, mut b) = (base.r as f32, base.g as f32, base.b as f32);
    for wash in washes {
        let distance = (idx as f32 - wash.progress).abs();
        if wash.width <= 0.0 || distance > wash.width {
            continue;
        }
        let weight = 1.0 - distance / wash.width;
        r += (wash.color.r as f32 - r) * weight;
        g += (wash.color.g as f32 - g) * weight;
        b += (wash.color.b as f32 - b) * weight;
    }
    Rgb::new(r as u8, g as u8, b as u8)
}

/// Camera shake; new requests take the max of intensity and duration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    pub intensity: f32,
    pub duration: f32,
    pub timer: f32,
}

impl ScreenShake {
    pub fn start(&mut self, intensity: f32, duration: f32) {
        self.intensity = self.intensity.max(intensity);
        self.duration = self.duration.max(duration);
        self.timer = self.duration;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 || self.timer <= 0.0 {
            return;
        }
        self.timer = (self.timer - dt).max(0.0);
        if self.timer <= 0.0 {
            self.clear();
        }
    }

    /// Current maximum offset in pixels
    pub fn strength(&self) -> f32 {
        if self.timer <= 0.0 || self.duration <= 0.0 {
            return 0.0;
        }
        self.intensity * self.timer / self.duration
    }
}

/// Individually switchable effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectToggle {
    Scanlines,
    Shake,
    Particles,
    Trail,
    Ripples,
}

/// Effect switches (persisted with the settings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectToggles {
    pub scanlines: bool,
    pub shake: bool,
    pub particles: bool,
    pub trail: bool,
    pub ripples: bool,
}

impl Default for EffectToggles {
    fn default() -> Self {
        Self::all(true)
    }
}

impl EffectToggles {
    pub fn all(on: bool) -> Self {
        Self {
            scanlines: on,
            shake: on,
            particles: on,
            trail: on,
            ripples: on,
        }
    }

    pub fn get(&self, toggle: EffectToggle) -> bool {
        match toggle {
            EffectToggle::Scanlines => self.scanlines,
            EffectToggle::Shake => self.shake,
            EffectToggle::Particles => self.particles,
            EffectToggle::Trail => self.trail,
            EffectToggle::Ripples => self.ripples,
        }
    }

    /// Flip one switch; returns the new value
    pub fn toggle(&mut self, toggle: EffectToggle) -> bool {
        let flag = match toggle {
            EffectToggle::Scanlines => &mut self.scanlines,
            EffectToggle::Shake => &mut self.shake,
            EffectToggle::Particles => &mut self.particles,
            EffectToggle::Trail => &mut self.trail,
            EffectToggle::Ripples => &mut self.ripples,
        };
        *flag = !*flag;
        *flag
    }
}
