//! Colour value type and the neon palette

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Add `amount` to every channel, saturating at 255
    pub fn brighten(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }

    /// Blend toward white by `strength` (clamped to 0..1)
    pub fn glow(self, strength: f32) -> Self {
        let s = strength.clamp(0.0, 1.0);
        let lift = |c: u8| (c as f32 + (255.0 - c as f32) * s).min(255.0) as u8;
        Self {
            r: lift(self.r),
            g: lift(self.g),
            b: lift(self.b),
        }
    }

    /// Linear blend toward `other` (t = 0 keeps self)
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Palette entries
pub mod palette {
    use super::Rgb;

    pub const BG_TOP: Rgb = Rgb::new(7, 10, 18);
    pub const BG_BOTTOM: Rgb = Rgb::new(2, 24, 43);
    pub const GRID: Rgb = Rgb::new(10, 40, 60);
    pub const TEXT: Rgb = Rgb::new(216, 239, 255);
    pub const BONUS: Rgb = Rgb::new(255, 208, 0);
    pub const RIPPLE_WHITE: Rgb = Rgb::new(240, 250, 255);
    pub const NEON_RED: Rgb = Rgb::new(255, 70, 90);

    /// Body colours cycled along the snake
    pub const SNAKE: [Rgb; 4] = [
        Rgb::new(57, 255, 233),
        Rgb::new(127, 255, 212),
        Rgb::new(0, 230, 255),
        Rgb::new(178, 255, 255),
    ];

    pub const FRUIT: [Rgb; 4] = [
        Rgb::new(255, 84, 138),
        Rgb::new(0, 230, 255),
        Rgb::new(141, 255, 112),
        Rgb::new(178, 127, 255),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brighten_saturates() {
        let c = Rgb::new(250, 10, 0).brighten(40);
        assert_eq!(c, Rgb::new(255, 50, 40));
    }

    #[test]
    fn test_glow_and_lerp_endpoints() {
        let c = Rgb::new(100, 0, 200);
        assert_eq!(c.glow(0.0), c);
        assert_eq!(c.glow(1.0), Rgb::new(255, 255, 255));
        assert_eq!(c.lerp(palette::BONUS, 0.0), c);
        assert_eq!(c.lerp(palette::BONUS, 1.0), palette::BONUS);
    }
}
