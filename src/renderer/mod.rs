//! Rendering module
//!
//! The simulation hands out a read-only [`FrameSnapshot`] each frame; a
//! [`Renderer`] turns it into quads (see [`shapes`]) and presents them.
//! The headless renderer builds the full draw list and reports the HUD
//! through the log.

pub mod quad;
pub mod shapes;

use std::collections::VecDeque;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use quad::Quad;
pub use shapes::{CellTint, ripple_cell_tints, shake_offset};

use crate::sim::{
    BonusFruit, EffectToggles, Fruit, GamePhase, GameState, GridRipple, Particle, RippleEnemy,
    ScreenShake, Snake, SnakeWash, SpawnIndicator, TrailBlob,
};

/// Everything a renderer may look at for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub snake: &'a Snake,
    pub fruit: Fruit,
    pub bonus: Option<BonusFruit>,
    pub particles: &'a [Particle],
    pub trail: &'a VecDeque<TrailBlob>,
    pub ripples: &'a [GridRipple],
    pub washes: &'a [SnakeWash],
    pub enemies: &'a [RippleEnemy],
    pub indicators: &'a [SpawnIndicator],
    pub score: u64,
    pub best: u64,
    /// Moves per second
    pub speed: f32,
    pub phase: GamePhase,
    pub fx: EffectToggles,
    pub shake: ScreenShake,
    pub fullscreen: bool,
}

impl<'a> FrameSnapshot<'a> {
    pub fn capture(state: &'a GameState, best: u64, fullscreen: bool) -> Self {
        Self {
            snake: &state.snake,
            fruit: state.fruit,
            bonus: state.bonus,
            particles: &state.particles,
            trail: &state.trail,
            ripples: &state.ripples,
            washes: &state.washes,
            enemies: &state.enemies,
            indicators: &state.indicators,
            score: state.score,
            best: best.max(state.score),
            speed: state.speed,
            phase: state.phase,
            fx: state.fx,
            shake: state.shake,
            fullscreen,
        }
    }

    /// Score line plus any overlay text for the current phase
    pub fn hud_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Score: {}  Best: {}  Speed: {:.1}",
            self.score, self.best, self.speed
        )];
        match self.phase {
            GamePhase::Running => {}
            GamePhase::Paused => {
                lines.push("Paused".to_string());
                lines.push("Press SPACE to resume".to_string());
            }
            GamePhase::GameOver => {
                lines.push("Game Over".to_string());
                lines.push(format!("Score: {}", self.score));
                lines.push(format!("Best:  {}", self.best));
                lines.push("R to restart / Q to quit".to_string());
            }
        }
        lines
    }
}

/// Presents frames
pub trait Renderer {
    /// `time` is seconds since start, used for pulses and shimmer
    fn render(&mut self, frame: &FrameSnapshot<'_>, time: f32);
}

/// Builds draw lists without a display
#[derive(Debug)]
pub struct HeadlessRenderer {
    rng: Pcg32,
    hud_interval: f32,
    last_hud: Option<f32>,
    last_phase: Option<GamePhase>,
    frames: u64,
    last_quads: usize,
    last_offset: IVec2,
}

impl HeadlessRenderer {
    /// Log the HUD at most once every `hud_interval` seconds
    pub fn new(hud_interval: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(0x5eed),
            hud_interval,
            last_hud: None,
            last_phase: None,
            frames: 0,
            last_quads: 0,
            last_offset: IVec2::ZERO,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Quads in the most recent draw list
    pub fn last_quad_count(&self) -> usize {
        self.last_quads
    }

    pub fn last_offset(&self) -> IVec2 {
        self.last_offset
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, frame: &FrameSnapshot<'_>, time: f32) {
        let offset = if frame.fx.shake {
            shake_offset(&mut self.rng, &frame.shake)
        } else {
            IVec2::ZERO
        };
        let quads = shapes::build_frame(frame, time, offset);
        self.frames += 1;
        self.last_quads = quads.len();
        self.last_offset = offset;

        let phase_changed = self.last_phase != Some(frame.phase);
        let due = self.last_hud.is_none_or(|t| time - t >= self.hud_interval);
        if phase_changed || due {
            log::info!(
                "[frame {}] {} ({} quads)",
                self.frames,
                frame.hud_lines().join(" | "),
                quads.len()
            );
            self.last_hud = Some(time);
            self.last_phase = Some(frame.phase);
        }
    }
}
