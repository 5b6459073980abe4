//! Shape generation for the arena
//!
//! Every builder turns read-only simulation data into [`Quad`]s; nothing
//! here mutates game state.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::FrameSnapshot;
use super::quad::{Quad, alpha};
use crate::color::{Rgb, palette};
use crate::consts::{BLOCK, GRID_CELLS, WINDOW_SIZE};
use crate::sim::{
    BonusFruit, Fruit, GridRipple, Particle, RippleEnemy, ScreenShake, Snake, SnakeWash,
    SpawnIndicator, TrailBlob, effects::segment_color,
};
use crate::{cell_center, cell_to_px};

const TRAIL_COLOR: Rgb = Rgb::new(0, 255, 255);

/// One grid cell lit by a ripple band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTint {
    pub cell: IVec2,
    pub color: Rgb,
    pub alpha: u8,
}

/// Cells inside a ripple's band with their tint strength
///
/// Strength falls off linearly from the band centre and fades with the
/// ripple's remaining time.
pub fn ripple_cell_tints(ripple: &GridRipple) -> Vec<CellTint> {
    let fade = ripple.fade();
    let radius = ripple.radius();
    if ripple.duration <= 0.0 || fade <= 0.0 || radius <= 0.0 || ripple.band_width <= 0.0 {
        return Vec::new();
    }

    let center = ripple.origin / BLOCK as f32;
    let reach = radius + ripple.band_width + 1.0;
    let lo = |c: f32| ((c - reach) as i32).max(0);
    let hi = |c: f32| ((c + reach) as i32).min(GRID_CELLS - 1);

    let mut tints = Vec::new();
    for gx in lo(center.x)..=hi(center.x) {
        for gy in lo(center.y)..=hi(center.y) {
            let cell = IVec2::new(gx, gy);
            let band_distance = ripple.band_distance(cell_center(cell));
            if band_distance > ripple.band_width {
                continue;
            }
            let strength = (1.0 - band_distance / ripple.band_width) * ripple.intensity * fade;
            if strength <= 0.0 {
                continue;
            }
            tints.push(CellTint {
                cell,
                color: ripple.color,
                alpha: alpha(strength, 200.0),
            });
        }
    }
    tints
}

/// Vertical gradient bands plus grid lines
pub fn background() -> Vec<Quad> {
    let mut quads = Vec::with_capacity((GRID_CELLS * 3) as usize);
    let full = WINDOW_SIZE as f32;
    for row in 0..GRID_CELLS {
        let t = row as f32 / (GRID_CELLS - 1) as f32;
        let color = palette::BG_TOP.lerp(palette::BG_BOTTOM, t);
        let min = Vec2::new(0.0, (row * BLOCK) as f32);
        quads.push(Quad::new(min, Vec2::new(full, BLOCK as f32), color, 255));
    }
    for i in 0..GRID_CELLS {
        let at = (i * BLOCK) as f32;
        quads.push(Quad::new(Vec2::new(at, 0.0), Vec2::new(1.0, full), palette::GRID, 90));
        quads.push(Quad::new(Vec2::new(0.0, at), Vec2::new(full, 1.0), palette::GRID, 90));
    }
    quads
}

pub fn ripples(ripples: &[GridRipple]) -> Vec<Quad> {
    ripples
        .iter()
        .flat_map(ripple_cell_tints)
        .map(|t| Quad::new(cell_to_px(t.cell).as_vec2(), Vec2::splat(BLOCK as f32), t.color, t.alpha))
        .collect()
}

/// Fruit with a soft glow
pub fn fruit(fruit: &Fruit, time: f32) -> Vec<Quad> {
    let center = cell_center(fruit.cell);
    let pulse = (time * 4.0).sin() * 0.5 + 0.5;
    vec![
        Quad::centered(center, BLOCK as f32 + 6.0 + pulse * 2.0, fruit.color, 70).rounded(6.0),
        Quad::centered(center, BLOCK as f32 - 2.0, fruit.color, 255).rounded(4.0),
        Quad::centered(center - Vec2::splat(3.0), 4.0, fruit.color.glow(0.6), 255).rounded(2.0),
    ]
}

/// Bonus core with an aura that shrinks as time runs out
pub fn bonus(bonus: &BonusFruit) -> Vec<Quad> {
    let ratio = bonus.ratio();
    if ratio <= 0.0 {
        return Vec::new();
    }
    let center = cell_center(bonus.cell);
    let aura = BLOCK as f32 + 4.0 + 14.0 * ratio;
    vec![
        Quad::centered(center, aura, palette::BONUS, alpha(ratio, 160.0)).rounded(aura / 3.0),
        Quad::centered(center, BLOCK as f32, palette::BONUS, 255).rounded(4.0),
    ]
}

/// Telegraph: halo, charging tile and a centre pulse
pub fn spawn_indicator(marker: &SpawnIndicator) -> Vec<Quad> {
    let eased = marker.progress().powf(0.8);
    let center = marker.pos;
    let halo = BLOCK as f32 * 2.4 + eased * 8.0;
    let tile = BLOCK as f32 + 6.0 + eased * 5.0;
    let inset = tile - 6.0;
    let fill_height = (inset * eased).max(3.0);
    let pulse = (6.0 + 6.0 * (1.0 - eased)).max(4.0);

    let tile_min = center - Vec2::splat(tile / 2.0);
    let inset_min = tile_min + Vec2::splat(3.0);
    vec![
        Quad::centered(center, halo, marker.color, (45.0 + 140.0 * eased) as u8).rounded(halo / 3.0),
        Quad::centered(center, tile, marker.color.brighten(12), 255).rounded(6.0),
        Quad::new(inset_min, Vec2::splat(inset), marker.color.lerp(Rgb::new(0, 0, 0), 0.15), 255)
            .rounded(4.0),
        Quad::new(
            Vec2::new(inset_min.x, inset_min.y + inset - fill_height),
            Vec2::new(inset, fill_height),
            palette::RIPPLE_WHITE,
            (110.0 + 100.0 * eased) as u8,
        )
        .rounded(3.0),
        Quad::centered(center, pulse, palette::RIPPLE_WHITE, (80.0 + 100.0 * (1.0 - eased)) as u8)
            .rounded(2.0),
    ]
}

/// Fading head trail; blobs grow as they fade
pub fn trail<'a>(trail: impl IntoIterator<Item = &'a TrailBlob>) -> Vec<Quad> {
    trail
        .into_iter()
        .filter_map(|blob| {
            let ratio = blob.life_ratio();
            let a = alpha(ratio, 140.0);
            if a == 0 {
                return None;
            }
            let side = BLOCK as f32 + (1.0 - ratio) * 8.0;
            let center = blob.pos + Vec2::splat(BLOCK as f32 / 2.0);
            Some(Quad::centered(center, side, TRAIL_COLOR, a).rounded(6.0))
        })
        .collect()
}

pub fn enemy(enemy: &RippleEnemy) -> Vec<Quad> {
    let size = enemy.size as f32;
    vec![
        Quad::centered(enemy.pos, size + 10.0, enemy.color, 90).rounded((size + 10.0) / 2.0),
        Quad::centered(enemy.pos, size, enemy.color, 255).rounded((size / 3.0).max(2.0)),
    ]
}

/// Particles fade with remaining life; fully faded ones are skipped
pub fn particles(particles: &[Particle]) -> Vec<Quad> {
    particles
        .iter()
        .filter_map(|p| {
            let a = alpha(p.life_ratio(), 255.0);
            if a == 0 {
                return None;
            }
            let side = p.size.max(1.0).floor();
            Some(Quad::centered(p.pos, side, p.color, a).rounded((side / 3.0).max(2.0)))
        })
        .collect()
}

/// Snake segments: palette cycle, wash blend, slow shimmer, pulsing head
pub fn snake(snake: &Snake, washes: &[SnakeWash], time: f32) -> Vec<Quad> {
    let wave = time * 2.0;
    let head_pulse = ((wave * 1.6).sin() + 1.0) * 0.5;
    snake
        .body
        .iter()
        .enumerate()
        .map(|(idx, &cell)| {
            let base = palette::SNAKE[idx % palette::SNAKE.len()];
            let shimmer = 0.08 * (0.5 + 0.5 * (wave + idx as f32 * 0.45).sin());
            let color = segment_color(idx, base, washes).glow(shimmer);
            let grow = if idx == 0 { (head_pulse * 2.0).round() } else { 0.0 };
            let min = cell_to_px(cell).as_vec2() - Vec2::splat(grow / 2.0);
            Quad::new(min, Vec2::splat(BLOCK as f32 + grow), color, 255).rounded(4.0)
        })
        .collect()
}

/// CRT-style dark line on every other row
pub fn scanlines() -> Vec<Quad> {
    (0..WINDOW_SIZE)
        .step_by(2)
        .map(|y| {
            Quad::new(
                Vec2::new(0.0, y as f32),
                Vec2::new(WINDOW_SIZE as f32, 1.0),
                Rgb::new(0, 0, 0),
                60,
            )
        })
        .collect()
}

/// Random whole-pixel camera offset for the current shake strength
pub fn shake_offset<R: Rng + ?Sized>(rng: &mut R, shake: &ScreenShake) -> IVec2 {
    let strength = shake.strength();
    if strength <= 0.0 {
        return IVec2::ZERO;
    }
    IVec2::new(
        rng.random_range(-strength..=strength) as i32,
        rng.random_range(-strength..=strength) as i32,
    )
}

/// Full draw list for a frame, back to front
pub fn build_frame(frame: &FrameSnapshot<'_>, time: f32, offset: IVec2) -> Vec<Quad> {
    let mut quads = background();
    if frame.fx.ripples {
        quads.extend(ripples(frame.ripples));
    }
    quads.extend(fruit(&frame.fruit, time));
    if let Some(b) = &frame.bonus {
        quads.extend(bonus(b));
    }
    quads.extend(frame.indicators.iter().flat_map(spawn_indicator));
    quads.extend(trail(frame.trail));
    quads.extend(frame.enemies.iter().flat_map(enemy));
    if frame.fx.particles {
        quads.extend(particles(frame.particles));
    }
    quads.extend(snake(frame.snake, frame.washes, time));
    if frame.fx.scanlines {
        quads.extend(scanlines());
    }

    if offset != IVec2::ZERO {
        let offset = offset.as_vec2();
        for q in &mut quads {
            *q = q.translated(offset);
        }
    }
    quads
}
