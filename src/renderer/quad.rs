//! Draw primitive for 2D rendering

use glam::Vec2;

use crate::color::Rgb;

/// Filled, optionally rounded rectangle in arena pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub min: Vec2,
    pub size: Vec2,
    pub color: Rgb,
    /// 255 is opaque
    pub alpha: u8,
    /// Corner radius in pixels
    pub radius: f32,
}

impl Quad {
    pub const fn new(min: Vec2, size: Vec2, color: Rgb, alpha: u8) -> Self {
        Self {
            min,
            size,
            color,
            alpha,
            radius: 0.0,
        }
    }

    /// Square of side `side` centred on `center`
    pub fn centered(center: Vec2, side: f32, color: Rgb, alpha: u8) -> Self {
        Self::new(center - Vec2::splat(side / 2.0), Vec2::splat(side), color, alpha)
    }

    pub fn rounded(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    pub fn translated(mut self, offset: Vec2) -> Self {
        self.min += offset;
        self
    }
}

/// Alpha from a 0..1 strength scaled to `max`
pub fn alpha(strength: f32, max: f32) -> u8 {
    (max * strength).clamp(0.0, 255.0) as u8
}
