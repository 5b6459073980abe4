//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Movement only in whole fixed steps
//! - Seeded RNG only (one `Pcg32` per match)
//! - Integer grid cells for occupancy, floats only for animation
//! - No rendering, audio or platform dependencies; sounds go out as events

pub mod collision;
pub mod effects;
pub mod enemy;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{IRect, enemies_hit_snake, ripple_band_hit};
pub use effects::{
    EffectToggle, EffectToggles, GridRipple, Particle, ParticleKind, ScreenShake, SnakeWash,
    TrailBlob,
};
pub use enemy::{RippleEnemy, SpawnIndicator};
pub use spawner::{Difficulty, SpawnScheduler};
pub use state::{BonusFruit, Direction, Fruit, GameEvent, GamePhase, GameState, Snake};
pub use tick::{advance, game_over, queue_direction, step, toggle_pause, update_effects};
