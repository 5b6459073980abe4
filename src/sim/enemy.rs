//! Ripple enemies
//!
//! Enemies home straight in on one shared target, ramping up their speed
//! over a short warmup. They cannot be fought directly: only a ripple band
//! passing over them removes them.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::collision::{IRect, ripple_band_hit};
use super::effects::GridRipple;
use super::state::GamePhase;
use crate::color::Rgb;
use crate::consts::*;

/// Randomized tries before a spawn-point search gives up
pub const SPAWN_ATTEMPTS: usize = 60;
/// Warmup given to freshly spawned enemies (seconds)
pub const ENEMY_WARMUP: f32 = 0.55;
/// Floor on warmup when a telegraphed enemy is admitted
pub const MIN_ADMIT_WARMUP: f32 = 0.35;

const IDLE_ORBIT_RADIUS: f32 = WINDOW_SIZE as f32 * 0.32;
const IDLE_ORBIT_SPEED: f32 = 0.55;
const IDLE_WOBBLE: f32 = WINDOW_SIZE as f32 * 0.08;

/// A hostile square that chases the snake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleEnemy {
    /// Centre in pixels
    pub pos: Vec2,
    /// Nominal speed (px/s)
    pub speed: f32,
    /// Side length in pixels
    pub size: i32,
    pub color: Rgb,
    pub age: f32,
    pub warmup: f32,
}

impl RippleEnemy {
    /// Fraction of nominal speed: 0.2 when fresh, 0.85 after warmup
    pub fn speed_scale(&self) -> f32 {
        let ratio = if self.warmup > 0.0 {
            (self.age / self.warmup).clamp(0.0, 1.0)
        } else {
            1.0
        };
        0.2 + 0.65 * ratio
    }

    pub fn effective_speed(&self) -> f32 {
        self.speed * self.speed_scale()
    }

    /// Collision box, centred on the truncated position
    pub fn rect(&self) -> IRect {
        IRect::centered(IVec2::new(self.pos.x as i32, self.pos.y as i32), self.size)
    }
}

/// Telegraph shown before an enemy becomes active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnIndicator {
    pub pos: Vec2,
    /// Countdown (seconds)
    pub time: f32,
    pub duration: f32,
    pub color: Rgb,
    /// Enemy admitted when the countdown ends
    pub payload: Option<RippleEnemy>,
}

impl SpawnIndicator {
    /// 0 when placed, 1 at admission
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        1.0 - (self.time / self.duration).clamp(0.0, 1.0)
    }
}

/// Constraints for a spawn-point search
#[derive(Debug, Clone, Copy)]
pub struct SpawnConstraints<'a> {
    /// Protected points (fruit, bonus) in pixels
    pub avoid: &'a [Vec2],
    pub min_distance_from_avoid: f32,
    /// Existing and pending enemy positions
    pub occupied: &'a [Vec2],
    pub min_spacing: f32,
}

/// Pick a jittered cell centre that honours the constraints
///
/// Returns `None` after [`SPAWN_ATTEMPTS`] failed tries.
pub fn find_spawn_point<R: Rng + ?Sized>(
    rng: &mut R,
    constraints: &SpawnConstraints<'_>,
) -> Option<Vec2> {
    let jitter = BLOCK as f32 * 0.35;
    let hi = (GRID_CELLS - 2).max(1);
    for _ in 0..SPAWN_ATTEMPTS {
        let cell = IVec2::new(rng.random_range(1..=hi), rng.random_range(1..=hi));
        let offset = Vec2::new(
            rng.random_range(-jitter..jitter),
            rng.random_range(-jitter..jitter),
        );
        let point = crate::cell_center(cell) + offset;

        if constraints.min_distance_from_avoid > 0.0
            && constraints
                .avoid
                .iter()
                .any(|a| point.distance(*a) < constraints.min_distance_from_avoid)
        {
            continue;
        }
        if constraints.min_spacing > 0.0
            && constraints
                .occupied
                .iter()
                .any(|o| point.distance(*o) < constraints.min_spacing)
        {
            continue;
        }
        return Some(point);
    }
    None
}

/// Roll a new (inactive) enemy at a searched spawn point
pub fn spawn_enemy<R: Rng + ?Sized>(
    rng: &mut R,
    constraints: &SpawnConstraints<'_>,
    speed_range: (f32, f32),
    color: Rgb,
    warmup: f32,
) -> Option<RippleEnemy> {
    let pos = find_spawn_point(rng, constraints)?;
    let (min, max) = speed_range;
    let speed = if max > min {
        rng.random_range(min..max)
    } else {
        min
    };
    Some(RippleEnemy {
        pos,
        speed,
        size: rng.random_range(10..=16),
        color,
        age: 0.0,
        warmup,
    })
}

/// Speed range for new enemies given the snake's moves per second
pub fn enemy_speed_range(moves_per_second: f32) -> (f32, f32) {
    let snake_px = moves_per_second * BLOCK as f32;
    let min = (snake_px * 0.4).max(28.0);
    let max = (snake_px * 0.6).max(min + 4.0);
    (min, max)
}

/// Move every enemy straight toward `target`
pub fn update_enemies(enemies: &mut [RippleEnemy], target: Vec2, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for enemy in enemies.iter_mut() {
        let to_target = target - enemy.pos;
        let length = to_target.length();
        if length <= 0.001 {
            continue;
        }
        enemy.age = (enemy.age + dt).min(enemy.warmup);
        let step = enemy.effective_speed() * dt / length;
        enemy.pos += to_target * step;
    }
}

/// Remove enemies inside any ripple band; returns the destroyed ones
pub fn cull_enemies_hit_by_ripples(
    enemies: &mut Vec<RippleEnemy>,
    ripples: &[GridRipple],
) -> Vec<RippleEnemy> {
    if enemies.is_empty() || ripples.is_empty() {
        return Vec::new();
    }
    let mut destroyed = Vec::new();
    enemies.retain(|enemy| {
        let hit = ripples.iter().any(|r| ripple_band_hit(r, enemy.pos));
        if hit {
            destroyed.push(*enemy);
        }
        !hit
    });
    destroyed
}

/// Where enemies head this frame
///
/// The snake head while running; otherwise a slow loop around the arena
/// centre (advances `idle_phase`).
pub fn chase_target(phase: GamePhase, head_center: Vec2, idle_phase: &mut f32, dt: f32) -> Vec2 {
    if phase == GamePhase::Running {
        return head_center;
    }
    let center = WINDOW_SIZE as f32 / 2.0;
    *idle_phase = (*idle_phase + dt * IDLE_ORBIT_SPEED).rem_euclid(std::f32::consts::TAU);
    let phi = *idle_phase;
    let wobble = (phi * 1.7).sin() * IDLE_WOBBLE;
    Vec2::new(
        center + phi.cos() * IDLE_ORBIT_RADIUS,
        center + (phi * 0.85).sin() * IDLE_ORBIT_RADIUS + wobble,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::RippleParams;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn enemy(pos: Vec2) -> RippleEnemy {
        RippleEnemy {
            pos,
            speed: 100.0,
            size: 12,
            color: Rgb::new(255, 70, 90),
            age: 0.0,
            warmup: 0.5,
        }
    }

    #[test]
    fn test_speed_ramps_over_warmup() {
        let mut e = enemy(Vec2::ZERO);
        assert!((e.speed_scale() - 0.2).abs() < 1e-6);
        e.age = 0.25;
        assert!((e.speed_scale() - 0.525).abs() < 1e-6);
        e.age = 0.5;
        assert!((e.speed_scale() - 0.85).abs() < 1e-6);
        e.warmup = 0.0;
        assert!((e.speed_scale() - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_update_moves_toward_target_and_ages() {
        let mut enemies = [enemy(Vec2::ZERO)];
        update_enemies(&mut enemies, Vec2::new(100.0, 0.0), 0.1);
        // age 0.1 of 0.5 -> scale 0.33 -> 33 px/s
        assert!((enemies[0].pos.x - 3.3).abs() < 1e-4);
        assert_eq!(enemies[0].pos.y, 0.0);
        assert!((enemies[0].age - 0.1).abs() < 1e-6);

        for _ in 0..6 {
            update_enemies(&mut enemies, Vec2::new(100.0, 0.0), 0.1);
        }
        assert_eq!(enemies[0].age, 0.5);
    }

    #[test]
    fn test_enemy_on_target_does_not_move_or_age() {
        let mut enemies = [enemy(Vec2::splat(50.0))];
        update_enemies(&mut enemies, Vec2::splat(50.0), 0.1);
        assert_eq!(enemies[0].age, 0.0);
        update_enemies(&mut enemies, Vec2::ZERO, 0.0);
        assert_eq!(enemies[0].pos, Vec2::splat(50.0));
    }

    #[test]
    fn test_spawn_point_respects_constraints() {
        let mut rng = Pcg32::seed_from_u64(11);
        let avoid = [Vec2::new(240.0, 240.0)];
        let occupied = [Vec2::new(100.0, 100.0)];
        let constraints = SpawnConstraints {
            avoid: &avoid,
            min_distance_from_avoid: BLOCK as f32 * 5.0,
            occupied: &occupied,
            min_spacing: BLOCK as f32 * 3.5,
        };
        for _ in 0..100 {
            if let Some(p) = find_spawn_point(&mut rng, &constraints) {
                assert!(p.distance(avoid[0]) >= BLOCK as f32 * 5.0);
                assert!(p.distance(occupied[0]) >= BLOCK as f32 * 3.5);
                let min = BLOCK as f32 * 1.0;
                let max = BLOCK as f32 * (GRID_CELLS - 1) as f32;
                assert!(p.x > min && p.x < max && p.y > min && p.y < max);
            }
        }
    }

    #[test]
    fn test_spawn_search_exhausts() {
        let mut rng = Pcg32::seed_from_u64(2);
        let avoid = [Vec2::new(240.0, 240.0)];
        let constraints = SpawnConstraints {
            avoid: &avoid,
            min_distance_from_avoid: WINDOW_SIZE as f32 * 2.0,
            occupied: &[],
            min_spacing: 0.0,
        };
        assert_eq!(find_spawn_point(&mut rng, &constraints), None);
        assert!(
            spawn_enemy(&mut rng, &constraints, (30.0, 40.0), Rgb::new(0, 0, 0), 0.55).is_none()
        );
    }

    #[test]
    fn test_spawned_enemy_parameters() {
        let mut rng = Pcg32::seed_from_u64(5);
        let constraints = SpawnConstraints {
            avoid: &[],
            min_distance_from_avoid: 0.0,
            occupied: &[],
            min_spacing: 0.0,
        };
        let (min, max) = enemy_speed_range(10.0);
        assert!((min - 64.0).abs() < 1e-3 && (max - 96.0).abs() < 1e-3);
        let e = spawn_enemy(&mut rng, &constraints, (min, max), Rgb::new(1, 1, 1), ENEMY_WARMUP)
            .expect("unconstrained search succeeds");
        assert!((min..max).contains(&e.speed));
        assert!((10..=16).contains(&e.size));
        assert_eq!(e.age, 0.0);
        assert_eq!(e.warmup, ENEMY_WARMUP);
    }

    #[test]
    fn test_speed_range_floor() {
        assert_eq!(enemy_speed_range(1.0), (28.0, 32.0));
    }

    #[test]
    fn test_cull_reports_destroyed() {
        let origin = Vec2::new(240.0, 240.0);
        let mut ripple = GridRipple::new(
            origin,
            Rgb::new(255, 255, 255),
            RippleParams {
                duration: 1.2,
                radius_cells: 10.0,
                band_width: 0.8,
                intensity: 1.0,
            },
        );
        ripple.timer = 0.6;
        let cell = BLOCK as f32;
        let mut enemies = vec![
            enemy(origin + Vec2::new(5.3 * cell, 0.0)),
            enemy(origin + Vec2::new(0.0, 6.5 * cell)),
        ];
        let destroyed = cull_enemies_hit_by_ripples(&mut enemies, &[ripple]);
        assert_eq!(destroyed.len(), 1);
        assert_eq!(enemies.len(), 1);
        assert!((enemies[0].pos.y - (origin.y + 6.5 * cell)).abs() < 1e-3);
    }

    #[test]
    fn test_chase_target() {
        let head = Vec2::new(168.0, 88.0);
        let mut phase = 0.0;
        assert_eq!(chase_target(GamePhase::Running, head, &mut phase, 0.1), head);
        assert_eq!(phase, 0.0);

        let t = chase_target(GamePhase::GameOver, head, &mut phase, 1.0);
        assert!((phase - 0.55).abs() < 1e-6);
        let center = WINDOW_SIZE as f32 / 2.0;
        assert!((t.x - (center + 0.55f32.cos() * IDLE_ORBIT_RADIUS)).abs() < 1e-3);
        assert!(t.distance(Vec2::splat(center)) < IDLE_ORBIT_RADIUS + IDLE_WOBBLE + 1.0);
    }

    #[test]
    fn test_indicator_progress() {
        let ind = SpawnIndicator {
            pos: Vec2::ZERO,
            time: 0.25,
            duration: 1.0,
            color: Rgb::new(0, 0, 0),
            payload: None,
        };
        assert!((ind.progress() - 0.75).abs() < 1e-6);
    }
}
