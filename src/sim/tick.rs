//! Fixed-step movement and per-frame simulation update
//!
//! A frame feeds real time into an accumulator; every full move interval
//! runs one discrete [`step`]. Effects, enemies and spawning then advance by
//! the frame delta (0 while paused).

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::collision::enemies_hit_snake;
use super::effects::{
    self, BONUS_ECHO_RIPPLE, BONUS_RIPPLE, BURST_COUNT, FRUIT_RIPPLE, GridRipple,
    HEAD_SPARK_COUNT, RippleParams,
};
use super::enemy::{chase_target, cull_enemies_hit_by_ripples, update_enemies};
use super::spawner::{start_enemy_spawns, tick_spawn_timer, update_spawn_indicators};
use super::state::{BonusFruit, Direction, GameEvent, GamePhase, GameState};
use crate::color::{Rgb, palette};
use crate::consts::*;
use crate::{cell_center, cell_to_px, wrap_cell};

/// Particles per destroyed enemy
const EXPLOSION_PARTICLES: usize = 18;

/// Advance the match by one frame of real time
///
/// `frame_dt` is clamped to [`MAX_FRAME_DT`]. Steps stop for the rest of
/// the frame once the match ends.
pub fn advance(state: &mut GameState, frame_dt: f32) {
    let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
    let mut effect_dt = dt;

    match state.phase {
        GamePhase::Running => {
            state.move_accumulator += dt;
            while state.is_running() && state.move_accumulator >= state.move_interval {
                step(state);
                state.move_accumulator -= state.move_interval;
            }
        }
        GamePhase::Paused => effect_dt = 0.0,
        GamePhase::GameOver => {}
    }

    update_effects(state, effect_dt);
}

/// Buffer a direction for the next step
///
/// Ignored unless running, and when it would reverse the current heading.
pub fn queue_direction(state: &mut GameState, dir: Direction) {
    if !state.is_running() || dir == state.snake.direction.opposite() {
        return;
    }
    if dir != state.snake.direction {
        state.events.push(GameEvent::Turn(dir));
    }
    state.snake.pending = dir;
}

pub fn toggle_pause(state: &mut GameState) {
    match state.phase {
        GamePhase::Running => state.phase = GamePhase::Paused,
        GamePhase::Paused => {
            state.phase = GamePhase::Running;
            state.move_accumulator = 0.0;
        }
        GamePhase::GameOver => {}
    }
}

/// End the match; repeated calls are no-ops
pub fn game_over(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    log::info!("Game over - score {}", state.score);
    state.events.push(GameEvent::GameOver { score: state.score });
    start_shake(state, 8.0, 0.6);
}

/// Move the snake one cell
pub fn step(state: &mut GameState) {
    state.snake.direction = state.snake.pending;
    let dir = state.snake.direction;
    let new_head = wrap_cell(state.snake.head() + dir.delta());

    if state.snake.contains(new_head) {
        game_over(state);
        return;
    }
    state.snake.body.push_front(new_head);

    if state.fx.trail {
        effects::leave_trail(&mut state.trail, cell_to_px(new_head));
    }
    let head_color = effects::segment_color(0, palette::SNAKE[0], &state.washes);
    effects::spawn_head_sparks(
        &mut state.particles,
        &mut state.rng,
        cell_center(new_head),
        dir.delta().as_vec2(),
        head_color,
        HEAD_SPARK_COUNT,
    );

    if new_head == state.fruit.cell {
        eat_fruit(state);
        // Growth: the tail stays
        return;
    }
    if state.bonus.is_some_and(|b| b.cell == new_head) {
        collect_bonus(state);
    }
    state.snake.body.pop_back();
}

fn pickup_colors(state: &GameState) -> [Rgb; 4] {
    [
        state.fruit.color,
        palette::BONUS,
        palette::SNAKE[0],
        palette::SNAKE[2],
    ]
}

fn eat_fruit(state: &mut GameState) {
    let fruit = state.fruit;
    state.score += FRUIT_POINTS;
    state.update_speed();
    state.events.push(GameEvent::FruitEaten { score: state.score });
    log::debug!("Fruit eaten, score {} speed {:.1}", state.score, state.speed);

    let colors = pickup_colors(state);
    effects::spawn_particles(
        &mut state.particles,
        &mut state.rng,
        cell_center(fruit.cell),
        &colors,
        BURST_COUNT,
    );
    emit_ripple(state, fruit.cell, fruit.color, FRUIT_RIPPLE);
    effects::start_wash(&mut state.washes, fruit.color, 12.5, 5.0);
    start_shake(state, 4.0, 0.25);

    state.spawn_fruit();
    maybe_spawn_bonus(state, BONUS_CHANCE);
    state.fruits_eaten += 1;
    if state.fruits_eaten == 1 {
        start_enemy_spawns(state);
    }
}

fn collect_bonus(state: &mut GameState) {
    let Some(bonus) = state.bonus.take() else {
        return;
    };
    state.score += BONUS_POINTS;
    state.update_speed();
    state.events.push(GameEvent::BonusCollected { score: state.score });
    log::debug!("Bonus collected, score {}", state.score);

    let colors = pickup_colors(state);
    effects::spawn_particles(
        &mut state.particles,
        &mut state.rng,
        cell_center(bonus.cell),
        &colors,
        BURST_COUNT,
    );
    emit_ripple(state, bonus.cell, palette::BONUS, BONUS_RIPPLE);
    emit_ripple(state, bonus.cell, palette::RIPPLE_WHITE, BONUS_ECHO_RIPPLE);
    effects::start_wash(&mut state.washes, palette::BONUS, 9.5, 8.0);
    start_shake(state, 6.0, 0.35);
    maybe_spawn_bonus(state, BONUS_CHAIN_CHANCE);
}

fn emit_ripple(state: &mut GameState, cell: IVec2, color: Rgb, params: RippleParams) {
    state
        .ripples
        .push(GridRipple::new(cell_center(cell), color, params));
    state.events.push(GameEvent::RippleEmitted);
}

fn start_shake(state: &mut GameState, intensity: f32, duration: f32) {
    if state.fx.shake {
        state.shake.start(intensity, duration);
    }
}

/// Grid steps the snake can make before a fresh bonus expires, minus one
pub fn bonus_reach_steps(move_interval: f32) -> i32 {
    ((BONUS_DURATION / move_interval).floor() as i32 - 1).max(1)
}

/// Free cells within reach of the head before a bonus would expire
pub fn reachable_bonus_cells(state: &GameState) -> Vec<IVec2> {
    let max_steps = bonus_reach_steps(state.move_interval);
    let head = state.snake.head();
    (0..GRID_CELLS)
        .flat_map(|x| (0..GRID_CELLS).map(move |y| IVec2::new(x, y)))
        .filter(|&cell| cell != state.fruit.cell && !state.snake.contains(cell))
        .filter(|&cell| {
            let d = (cell - head).abs();
            d.x + d.y <= max_steps
        })
        .collect()
}

/// Drop a bonus with probability `chance` unless one is already out
pub fn maybe_spawn_bonus(state: &mut GameState, chance: f32) {
    if state.bonus.is_some() || state.rng.random::<f32>() > chance {
        return;
    }
    let options = reachable_bonus_cells(state);
    if let Some(&cell) = options.choose(&mut state.rng) {
        state.bonus = Some(BonusFruit {
            cell,
            timer: BONUS_DURATION,
        });
    }
}

fn tick_bonus(state: &mut GameState, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    if let Some(bonus) = state.bonus.as_mut() {
        bonus.timer -= dt;
        if bonus.timer <= 0.0 {
            state.bonus = None;
        }
    }
}

fn spawn_enemy_explosions(state: &mut GameState, destroyed: &[super::enemy::RippleEnemy]) {
    if destroyed.is_empty() {
        return;
    }
    for enemy in destroyed {
        effects::spawn_particles(
            &mut state.particles,
            &mut state.rng,
            enemy.pos.trunc(),
            &[enemy.color],
            EXPLOSION_PARTICLES,
        );
    }
    state
        .events
        .push(GameEvent::EnemiesDestroyed(destroyed.len()));
}

/// Continuous-time update of effects, enemies, spawning and the bonus timer
///
/// `dt <= 0` leaves everything untouched.
pub fn update_effects(state: &mut GameState, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    state.shake.update(dt);
    update_spawn_indicators(state, dt);

    effects::update_trail(&mut state.trail, dt);
    effects::update_particles(&mut state.particles, dt);
    effects::update_ripples(&mut state.ripples, dt);

    let target = chase_target(
        state.phase,
        state.head_center(),
        &mut state.enemy_idle_phase,
        dt,
    );
    update_enemies(&mut state.enemies, target, dt);
    let destroyed = cull_enemies_hit_by_ripples(&mut state.enemies, &state.ripples);
    spawn_enemy_explosions(state, &destroyed);

    if state.is_running() && enemies_hit_snake(&state.enemies, &state.snake.body) {
        game_over(state);
        return;
    }
    tick_spawn_timer(state, dt);

    let max_index = state.snake.len();
    effects::update_washes(&mut state.washes, dt, max_index);
    tick_bonus(state, dt);
}

/// Top-left pixel of the head cell
pub fn head_px(state: &GameState) -> Vec2 {
    cell_to_px(state.snake.head()).as_vec2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::RippleEnemy;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn quiet_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.fruit.cell = IVec2::new(25, 25);
        state
    }

    fn enemy_at(pos: Vec2) -> RippleEnemy {
        RippleEnemy {
            pos,
            speed: 60.0,
            size: 12,
            color: palette::NEON_RED,
            age: 0.0,
            warmup: 0.55,
        }
    }

    #[test]
    fn test_single_step_moves_head_right() {
        let mut state = quiet_state(1);
        assert_eq!(head_px(&state), Vec2::new(160.0, 80.0));

        step(&mut state);

        assert_eq!(head_px(&state), Vec2::new(176.0, 80.0));
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_fruit_step_grows_and_scores() {
        let mut state = GameState::new(2);
        state.fruit.cell = IVec2::new(11, 5);

        step(&mut state);

        assert_eq!(state.score, FRUIT_POINTS);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.fruits_eaten, 1);
        assert!((state.speed - (MOVES_PER_SECOND + 10.0 / SPEED_STEP)).abs() < 1e-6);
        assert!(state.spawner.active);
        assert_ne!(state.fruit.cell, IVec2::new(11, 5));
        assert_eq!(state.ripples.len(), 1);
        assert!(state.events.contains(&GameEvent::FruitEaten { score: 10 }));
        assert!(state.events.contains(&GameEvent::RippleEmitted));
    }

    #[test]
    fn test_length_constant_without_fruit() {
        let mut state = quiet_state(3);
        for _ in 0..12 {
            step(&mut state);
            assert_eq!(state.snake.len(), 3);
        }
    }

    #[test]
    fn test_wraps_at_edges() {
        let mut state = quiet_state(4);
        state.snake.body = [IVec2::new(29, 5), IVec2::new(28, 5), IVec2::new(27, 5)].into();
        step(&mut state);
        assert_eq!(state.snake.head(), IVec2::new(0, 5));
    }

    #[test]
    fn test_self_collision_ends_match_before_commit() {
        let mut state = quiet_state(5);
        state.snake.body = [
            IVec2::new(5, 5),
            IVec2::new(5, 6),
            IVec2::new(6, 6),
            IVec2::new(6, 5),
            IVec2::new(7, 5),
        ]
        .into();
        state.snake.direction = Direction::Up;
        state.snake.pending = Direction::Right;

        step(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.snake.head(), IVec2::new(5, 5));
        assert_eq!(state.snake.len(), 5);
        assert!(matches!(state.events[..], [GameEvent::GameOver { score: 0 }]));

        game_over(&mut state);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_queue_direction_rules() {
        let mut state = quiet_state(6);
        queue_direction(&mut state, Direction::Left);
        assert_eq!(state.snake.pending, Direction::Right);

        queue_direction(&mut state, Direction::Right);
        assert!(state.events.is_empty());

        queue_direction(&mut state, Direction::Up);
        assert_eq!(state.snake.pending, Direction::Up);
        assert_eq!(state.events, vec![GameEvent::Turn(Direction::Up)]);

        toggle_pause(&mut state);
        queue_direction(&mut state, Direction::Down);
        assert_eq!(state.snake.pending, Direction::Up);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = quiet_state(7);
        state.particles.clear();
        state.ripples.push(GridRipple::new(Vec2::ZERO, palette::BONUS, FRUIT_RIPPLE));

        toggle_pause(&mut state);
        assert_eq!(state.phase, GamePhase::Paused);
        let head = state.snake.head();
        advance(&mut state, 0.1);
        assert_eq!(state.snake.head(), head);
        assert_eq!(state.ripples[0].timer, FRUIT_RIPPLE.duration);

        toggle_pause(&mut state);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.move_accumulator, 0.0);
        advance(&mut state, 0.1);
        assert_ne!(state.snake.head(), head);
    }

    #[test]
    fn test_pause_ignored_after_game_over() {
        let mut state = quiet_state(8);
        game_over(&mut state);
        toggle_pause(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_accumulator_runs_multiple_steps() {
        let mut state = quiet_state(9);
        state.score = 360;
        state.update_speed();
        // 16 moves/s: 0.1s holds one step and carries the rest
        advance(&mut state, 0.1);
        assert_eq!(state.snake.head(), IVec2::new(11, 5));
        advance(&mut state, 0.1);
        assert_eq!(state.snake.head(), IVec2::new(13, 5));
        // Oversized frames are clamped
        advance(&mut state, 5.0);
        assert!(state.snake.head().x <= 15);
    }

    #[test]
    fn test_enemy_contact_ends_match() {
        let mut state = quiet_state(10);
        state.enemies.push(enemy_at(state.head_center()));
        update_effects(&mut state, 0.01);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_ripple_destroys_enemy_in_band() {
        let mut state = quiet_state(11);
        let origin = Vec2::new(240.0, 400.0);
        let mut ripple = GridRipple::new(
            origin,
            palette::BONUS,
            RippleParams {
                duration: 1.2,
                radius_cells: 10.0,
                band_width: 0.8,
                intensity: 1.0,
            },
        );
        ripple.timer = 0.6 + 0.001;
        state.ripples.push(ripple);
        let cell = BLOCK as f32;
        state.enemies.push(enemy_at(origin + Vec2::new(-5.3 * cell, 0.0)));
        state.enemies.push(enemy_at(origin + Vec2::new(6.5 * cell, 0.0)));
        state.phase = GamePhase::GameOver;

        update_effects(&mut state, 0.001);

        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].pos.x > origin.x);
        assert!(state.events.contains(&GameEvent::EnemiesDestroyed(1)));
        assert_eq!(state.particles.len(), EXPLOSION_PARTICLES);
    }

    #[test]
    fn test_bonus_pickup() {
        let mut state = quiet_state(12);
        state.bonus = Some(BonusFruit {
            cell: IVec2::new(11, 5),
            timer: BONUS_DURATION,
        });
        step(&mut state);
        assert_eq!(state.score, BONUS_POINTS);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.ripples.len(), 2);
        assert!(state.events.contains(&GameEvent::BonusCollected { score: 35 }));
        assert!(state.shake.intensity >= 6.0);
    }

    #[test]
    fn test_bonus_expires() {
        let mut state = quiet_state(13);
        state.bonus = Some(BonusFruit {
            cell: IVec2::new(20, 20),
            timer: 0.05,
        });
        state.phase = GamePhase::GameOver;
        update_effects(&mut state, 0.1);
        assert!(state.bonus.is_none());
    }

    #[test]
    fn test_disabled_shake_and_trail() {
        let mut state = quiet_state(14);
        state.fx.shake = false;
        state.fx.trail = false;
        step(&mut state);
        game_over(&mut state);
        assert!(state.trail.is_empty());
        assert_eq!(state.shake.strength(), 0.0);
    }

    #[test]
    fn test_determinism() {
        let run = |seed| {
            let mut state = GameState::new(seed);
            let turns = [Direction::Down, Direction::Left, Direction::Down, Direction::Right];
            for frame in 0..600 {
                if frame % 37 == 0 {
                    queue_direction(&mut state, turns[(frame / 37) % turns.len()]);
                }
                advance(&mut state, 1.0 / 60.0);
            }
            state
        };
        let a = run(99_999);
        let b = run(99_999);
        assert_eq!(a.snake, b.snake);
        assert_eq!(a.score, b.score);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.events, b.events);
    }

    proptest! {
        #[test]
        fn prop_body_never_overlaps_while_running(
            seed in any::<u64>(),
            turns in proptest::collection::vec(0usize..4, 1..80),
        ) {
            let mut state = GameState::new(seed);
            for t in turns {
                queue_direction(&mut state, Direction::ALL[t]);
                advance(&mut state, 0.1);
                if state.phase != GamePhase::Running {
                    break;
                }
                let unique: HashSet<IVec2> = state.snake.body.iter().copied().collect();
                prop_assert_eq!(unique.len(), state.snake.len());
            }
        }

        #[test]
        fn prop_bonus_candidates_are_reachable(
            seed in any::<u64>(),
            score in 0u64..1_000,
            hx in 0i32..GRID_CELLS,
            hy in 0i32..GRID_CELLS,
        ) {
            let mut state = GameState::new(seed);
            state.score = score;
            state.update_speed();
            let head = IVec2::new(hx, hy);
            state.snake.body = [head].into();
            let limit = (BONUS_DURATION / state.move_interval).floor() as i32 - 1;
            for cell in reachable_bonus_cells(&state) {
                let d = (cell - head).abs();
                prop_assert!(d.x + d.y <= limit);
                prop_assert!(cell != state.fruit.cell && cell != head);
            }
        }
    }
}
