//! Difficulty-driven enemy spawning
//!
//! Inactive until the first fruit is eaten. Once active, a countdown fires
//! spawn batches sized to the gap between the desired and the current enemy
//! count. Spawns are telegraphed: a marker holds the enemy until its own
//! countdown ends.

use glam::Vec2;
use rand::Rng;

use super::effects::spawn_particles;
use super::enemy::{
    ENEMY_WARMUP, MIN_ADMIT_WARMUP, SpawnConstraints, SpawnIndicator, enemy_speed_range,
    spawn_enemy,
};
use super::state::{GameEvent, GameState};
use crate::cell_center;
use crate::color::palette;
use crate::consts::*;

/// Cap on concurrent enemies (live + telegraphed)
pub const MAX_DESIRED_ENEMIES: usize = 5;
/// Most spawns attempted in one batch
pub const MAX_BATCH: usize = 3;
/// Lower bound on the delay between batches (seconds)
pub const MIN_SPAWN_DELAY: f32 = 0.45;
/// Retry delay after a batch spawned nothing
pub const RETRY_DELAY: f32 = 0.4;
/// Telegraph countdown range (seconds)
pub const INDICATOR_DURATION: (f32, f32) = (0.9, 1.2);
/// Particles when a telegraphed enemy is admitted
const ADMIT_PARTICLES: usize = 10;

/// Scheduler state; lives inside [`GameState`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnScheduler {
    pub active: bool,
    /// Seconds until the next batch
    pub timer: f32,
    /// Spawn-point searches that came back empty (advisory)
    pub failed_searches: u32,
}

/// Live metrics the difficulty curve is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// Moves per second
    pub speed: f32,
    pub score: u64,
    pub fruits_eaten: u32,
}

impl Difficulty {
    pub fn of(state: &GameState) -> Self {
        Self {
            speed: state.speed,
            score: state.score,
            fruits_eaten: state.fruits_eaten,
        }
    }

    /// Target concurrent enemy count, in [1, 5]
    pub fn desired_enemies(&self) -> usize {
        let desired = 1 + (self.fruits_eaten / 2) as u64 + self.score / 80;
        desired.clamp(1, MAX_DESIRED_ENEMIES as u64) as usize
    }

    /// Spawn pressure from speed, score and progress
    pub fn level(&self) -> f32 {
        let speed_factor = (self.speed / MOVES_PER_SECOND).max(1.0);
        let score_factor = (self.score as f32 / 60.0).min(3.0);
        let fruit_factor = (self.fruits_eaten as f32 / 6.0).min(1.0);
        1.0 + 0.45 * (speed_factor - 1.0) + 0.3 * score_factor + 0.25 * fruit_factor
    }

    /// Delay before the next batch, given a base draw and the current deficit
    pub fn spawn_delay(&self, base: f32, deficit: usize) -> f32 {
        let urgency = if deficit > 0 {
            1.0 + 0.4 * deficit as f32
        } else {
            0.8
        };
        (base / (self.level() / urgency).max(0.6)).max(MIN_SPAWN_DELAY)
    }
}

fn active_total(state: &GameState) -> usize {
    state.enemies.len() + state.pending_spawn_count()
}

/// Switch the scheduler on and plan the first batch; no-op if already on
pub fn start_enemy_spawns(state: &mut GameState) {
    if state.spawner.active {
        return;
    }
    state.spawner.active = true;
    schedule_enemy_spawn(state);
    log::debug!("Enemy spawning started, first batch in {:.2}s", state.spawner.timer);
}

pub fn schedule_enemy_spawn(state: &mut GameState) {
    let difficulty = Difficulty::of(state);
    let base = state.rng.random_range(1.8..2.6);
    let deficit = difficulty
        .desired_enemies()
        .saturating_sub(active_total(state));
    state.spawner.timer = difficulty.spawn_delay(base, deficit);
}

/// Count down and fire a batch when due
pub fn tick_spawn_timer(state: &mut GameState, dt: f32) {
    if !state.spawner.active || dt <= 0.0 {
        return;
    }
    state.spawner.timer = (state.spawner.timer - dt).max(0.0);
    if state.spawner.timer > 0.0 {
        return;
    }

    let desired = Difficulty::of(state).desired_enemies();
    let deficit = desired.saturating_sub(active_total(state));
    if deficit == 0 {
        schedule_enemy_spawn(state);
        return;
    }

    let budget = deficit.min(MAX_BATCH);
    let mut spawned = 0;
    for _ in 0..budget {
        if !try_spawn_enemy(state) {
            break;
        }
        spawned += 1;
    }

    if spawned > 0 {
        log::debug!("Spawn batch: {spawned}/{budget} telegraphed (desired {desired})");
        schedule_enemy_spawn(state);
    } else {
        state.spawner.timer = RETRY_DELAY;
    }
}

/// Search a spawn point and telegraph an enemy there
///
/// Returns false when the search is exhausted.
pub fn try_spawn_enemy(state: &mut GameState) -> bool {
    let mut avoid = vec![cell_center(state.fruit.cell)];
    if let Some(bonus) = &state.bonus {
        avoid.push(cell_center(bonus.cell));
    }
    let occupied: Vec<Vec2> = state
        .enemies
        .iter()
        .map(|e| e.pos)
        .chain(state.indicators.iter().filter_map(|i| i.payload.map(|p| p.pos)))
        .collect();
    let constraints = SpawnConstraints {
        avoid: &avoid,
        min_distance_from_avoid: BLOCK as f32 * 5.0,
        occupied: &occupied,
        min_spacing: BLOCK as f32 * 3.5,
    };

    let Some(enemy) = spawn_enemy(
        &mut state.rng,
        &constraints,
        enemy_speed_range(state.speed),
        palette::NEON_RED,
        ENEMY_WARMUP,
    ) else {
        state.spawner.failed_searches += 1;
        log::debug!(
            "Spawn-point search exhausted ({} so far)",
            state.spawner.failed_searches
        );
        return false;
    };

    let countdown = state
        .rng
        .random_range(INDICATOR_DURATION.0..INDICATOR_DURATION.1);
    state.indicators.push(SpawnIndicator {
        pos: enemy.pos,
        time: countdown,
        duration: countdown,
        color: enemy.color,
        payload: Some(enemy),
    });
    state.events.push(GameEvent::SpawnWarning(enemy.pos));
    true
}

/// Count telegraphs down and admit their enemies on expiry
pub fn update_spawn_indicators(state: &mut GameState, dt: f32) {
    if dt <= 0.0 || state.indicators.is_empty() {
        return;
    }
    let mut survivors = Vec::with_capacity(state.indicators.len());
    for mut marker in std::mem::take(&mut state.indicators) {
        marker.time = (marker.time - dt).max(0.0);
        if marker.time > 0.0 {
            survivors.push(marker);
            continue;
        }
        let Some(mut enemy) = marker.payload else {
            continue;
        };
        enemy.age = 0.0;
        enemy.warmup = enemy.warmup.max(MIN_ADMIT_WARMUP);
        state.enemies.push(enemy);
        spawn_particles(
            &mut state.particles,
            &mut state.rng,
            marker.pos.trunc(),
            &[marker.color],
            ADMIT_PARTICLES,
        );
        state.events.push(GameEvent::EnemySpawned(marker.pos));
    }
    state.indicators = survivors;
}
