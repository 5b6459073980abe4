//! Neon Snake - a neon grid snake arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, effects, enemies, spawning)
//! - `audio`: Procedural sound synthesis and voice mixing
//! - `renderer`: Read-only frame snapshots and colour math for a renderer
//! - `platform`: Input intents, frame limiting, demo autopilot
//! - `persistence`: Data directory and file path resolution
//! - `game`: Frame driver tying the pieces together

pub mod audio;
pub mod color;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::HighScoreStore;
pub use settings::Settings;

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Arena side length in pixels (square arena)
    pub const WINDOW_SIZE: i32 = 480;
    /// Grid cell side length in pixels
    pub const BLOCK: i32 = 16;
    /// Cells per arena side
    pub const GRID_CELLS: i32 = WINDOW_SIZE / BLOCK;

    /// Frame-rate cap for the driver loop
    pub const FPS: u32 = 180;
    /// Largest frame delta fed into the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Snake moves per second at score 0
    pub const MOVES_PER_SECOND: f32 = 10.0;
    /// Points per +1 move/s
    pub const SPEED_STEP: f32 = 60.0;
    /// Speed ceiling (moves per second)
    pub const MAX_MOVES_PER_SECOND: f32 = 16.0;

    /// Points for a regular fruit
    pub const FRUIT_POINTS: u64 = 10;
    /// Bonus fruit lifetime (seconds)
    pub const BONUS_DURATION: f32 = 3.5;
    /// Points for a bonus fruit
    pub const BONUS_POINTS: u64 = 35;
    /// Chance of a bonus after eating a regular fruit
    pub const BONUS_CHANCE: f32 = 0.45;
    /// Chance of a follow-up bonus after collecting one
    pub const BONUS_CHAIN_CHANCE: f32 = 0.35;

    /// Particle lifetime (seconds)
    pub const PARTICLE_LIFE: f32 = 0.45;
    /// Maximum live particles
    pub const MAX_PARTICLES: usize = 600;
    /// Trail blob lifetime (seconds)
    pub const TRAIL_LIFE: f32 = 0.35;
    /// Maximum trail blobs
    pub const MAX_TRAIL: usize = 80;

    /// Default wash speed (segments per second)
    pub const SNAKE_WASH_SPEED: f32 = 11.0;
    /// Default wash band width (segments)
    pub const SNAKE_WASH_WIDTH: f32 = 6.0;
}

use consts::{BLOCK, GRID_CELLS};

/// Top-left pixel of a grid cell
#[inline]
pub fn cell_to_px(cell: IVec2) -> IVec2 {
    cell * BLOCK
}

/// Pixel-space centre of a grid cell
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    (cell * BLOCK).as_vec2() + Vec2::splat(BLOCK as f32 / 2.0)
}

/// Wrap a cell coordinate onto the toroidal grid
#[inline]
pub fn wrap_cell(cell: IVec2) -> IVec2 {
    IVec2::new(cell.x.rem_euclid(GRID_CELLS), cell.y.rem_euclid(GRID_CELLS))
}

/// Distance between two pixel positions measured in grid cells
#[inline]
pub fn distance_in_cells(a: Vec2, b: Vec2) -> f32 {
    a.distance(b) / BLOCK as f32
}
