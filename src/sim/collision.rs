//! Collision tests
//!
//! Enemy-vs-snake uses integer axis-aligned boxes with strict overlap
//! (touching edges do not collide). Ripple hits are a band test on the
//! distance from the ripple origin.

use glam::{IVec2, Vec2};

use super::effects::GridRipple;
use super::enemy::RippleEnemy;
use crate::cell_to_px;
use crate::consts::BLOCK;

/// Integer axis-aligned box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IRect {
    pub min: IVec2,
    pub size: IVec2,
}

impl IRect {
    pub fn new(min: IVec2, size: IVec2) -> Self {
        Self { min, size }
    }

    /// Square of side `side` centred on `center` (odd sides lean up-left)
    pub fn centered(center: IVec2, side: i32) -> Self {
        Self {
            min: center - IVec2::splat(side / 2),
            size: IVec2::splat(side),
        }
    }

    /// Pixel box of a grid cell
    pub fn cell(cell: IVec2) -> Self {
        Self::new(cell_to_px(cell), IVec2::splat(BLOCK))
    }

    pub fn max(&self) -> IVec2 {
        self.min + self.size
    }

    /// Strict overlap; empty boxes never overlap
    pub fn overlaps(&self, other: &IRect) -> bool {
        if self.size.x <= 0 || self.size.y <= 0 || other.size.x <= 0 || other.size.y <= 0 {
            return false;
        }
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.y < b_max.y && other.min.y < a_max.y
    }
}

/// Whether any enemy box overlaps any body cell
pub fn enemies_hit_snake<'a>(
    enemies: &[RippleEnemy],
    body: impl IntoIterator<Item = &'a IVec2>,
) -> bool {
    if enemies.is_empty() {
        return false;
    }
    let enemy_rects: Vec<IRect> = enemies.iter().map(RippleEnemy::rect).collect();
    body.into_iter().any(|&cell| {
        let cell_rect = IRect::cell(cell);
        enemy_rects.iter().any(|r| r.overlaps(&cell_rect))
    })
}

/// Whether `point` (pixels) lies inside the ripple's active band
///
/// A ripple that has not started expanding (or has no duration) hits nothing.
pub fn ripple_band_hit(ripple: &GridRipple, point: Vec2) -> bool {
    if ripple.duration <= 0.0 || ripple.progress() <= 0.0 {
        return false;
    }
    ripple.band_distance(point) <= ripple.band_width
}
