//! Game state and core simulation types
//!
//! Everything a match owns lives in [`GameState`]; subsystems take it by
//! `&mut` and never reach for globals. Grid occupancy is integer-only.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::effects::{EffectToggles, GridRipple, Particle, ScreenShake, SnakeWash, TrailBlob};
use super::enemy::{RippleEnemy, SpawnIndicator};
use super::spawner::SpawnScheduler;
use crate::cell_center;
use crate::color::{Rgb, palette};
use crate::consts::*;

/// Movement direction on the grid (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// One-cell offset
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Coarse match state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    Paused,
    /// Terminal until restart
    GameOver,
}

/// Snake body and heading
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Grid cells, head first
    pub body: VecDeque<IVec2>,
    pub direction: Direction,
    /// Buffered direction applied at the start of the next step
    pub pending: Direction,
}

impl Snake {
    /// Starting snake: three cells heading right, head at cell (10, 5)
    pub fn new() -> Self {
        Self {
            body: VecDeque::from([IVec2::new(10, 5), IVec2::new(9, 5), IVec2::new(8, 5)]),
            direction: Direction::Right,
            pending: Direction::Right,
        }
    }

    pub fn head(&self) -> IVec2 {
        self.body.front().copied().unwrap_or(IVec2::ZERO)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.body.contains(&cell)
    }
}

impl Default for Snake {
    fn default() -> Self {
        Self::new()
    }
}

/// The regular fruit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fruit {
    pub cell: IVec2,
    pub color: Rgb,
}

/// Time-limited bonus pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusFruit {
    pub cell: IVec2,
    /// Seconds left before it vanishes
    pub timer: f32,
}

impl BonusFruit {
    /// Remaining lifetime fraction
    pub fn ratio(&self) -> f32 {
        (self.timer / BONUS_DURATION).clamp(0.0, 1.0)
    }
}

/// Notable things that happened during a frame
///
/// Drained by the driver; the simulation never talks to audio directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Direction intent accepted and differs from the current heading
    Turn(Direction),
    FruitEaten { score: u64 },
    BonusCollected { score: u64 },
    RippleEmitted,
    /// Spawn telegraph placed at a pixel position
    SpawnWarning(Vec2),
    /// Telegraphed enemy admitted at a pixel position
    EnemySpawned(Vec2),
    /// Enemies removed by ripples this frame
    EnemiesDestroyed(usize),
    GameOver { score: u64 },
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    pub snake: Snake,
    pub fruit: Fruit,
    pub bonus: Option<BonusFruit>,
    pub score: u64,
    pub fruits_eaten: u32,
    /// Current moves per second
    pub speed: f32,
    /// Seconds per move
    pub move_interval: f32,
    /// Leftover frame time not yet consumed by steps
    pub move_accumulator: f32,
    pub particles: Vec<Particle>,
    pub trail: VecDeque<TrailBlob>,
    pub ripples: Vec<GridRipple>,
    pub washes: Vec<SnakeWash>,
    pub enemies: Vec<RippleEnemy>,
    pub indicators: Vec<SpawnIndicator>,
    pub spawner: SpawnScheduler,
    pub shake: ScreenShake,
    pub fx: EffectToggles,
    /// Phase of the idle orbit enemies follow when the match is not running
    pub enemy_idle_phase: f32,
    /// Pending events, oldest first
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new match with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_effects(seed, EffectToggles::default())
    }

    pub fn with_effects(seed: u64, fx: EffectToggles) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            snake: Snake::new(),
            fruit: Fruit {
                cell: IVec2::ZERO,
                color: palette::FRUIT[0],
            },
            bonus: None,
            score: 0,
            fruits_eaten: 0,
            speed: MOVES_PER_SECOND,
            move_interval: 1.0 / MOVES_PER_SECOND,
            move_accumulator: 0.0,
            particles: Vec::new(),
            trail: VecDeque::with_capacity(MAX_TRAIL),
            ripples: Vec::new(),
            washes: Vec::new(),
            enemies: Vec::new(),
            indicators: Vec::new(),
            spawner: SpawnScheduler::default(),
            shake: ScreenShake::default(),
            fx,
            enemy_idle_phase: 0.0,
            events: Vec::new(),
        };
        state.spawn_fruit();
        state.update_speed();
        state
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Recompute speed and move interval from the score
    pub fn update_speed(&mut self) {
        let target = MOVES_PER_SECOND + self.score as f32 / SPEED_STEP;
        self.speed = target.clamp(1.0, MAX_MOVES_PER_SECOND);
        self.move_interval = 1.0 / self.speed;
    }

    /// Pixel centre of the head cell
    pub fn head_center(&self) -> Vec2 {
        cell_center(self.snake.head())
    }

    /// Move the fruit to a random free, non-corner cell with a random colour
    ///
    /// Leaves the fruit in place if no cell is free.
    pub fn spawn_fruit(&mut self) {
        let max = GRID_CELLS - 1;
        let corners = [
            IVec2::new(0, 0),
            IVec2::new(0, max),
            IVec2::new(max, 0),
            IVec2::new(max, max),
        ];
        let free: Vec<IVec2> = (0..GRID_CELLS)
            .flat_map(|x| (0..GRID_CELLS).map(move |y| IVec2::new(x, y)))
            .filter(|cell| !corners.contains(cell) && !self.snake.contains(*cell))
            .collect();

        let Some(&cell) = free.choose(&mut self.rng) else {
            log::debug!("No free cell for fruit");
            return;
        };
        let color = palette::FRUIT
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(palette::FRUIT[0]);
        self.fruit = Fruit { cell, color };
    }

    /// Enemies waiting behind a telegraph
    pub fn pending_spawn_count(&self) -> usize {
        self.indicators.iter().filter(|i| i.payload.is_some()).count()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
