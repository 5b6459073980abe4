//! Platform glue
//!
//! Input intents, frame pacing and the demo autopilot. Nothing here owns
//! game state; the driver feeds intents into [`crate::Game`].

pub mod autopilot;

use std::thread;
use std::time::{Duration, Instant};

pub use autopilot::Autopilot;

use crate::consts::MAX_FRAME_DT;
use crate::sim::{Direction, EffectToggle};

/// Physical keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    F11,
    Escape,
    Char(char),
}

/// Discrete player intent, delivered in order once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Direction(Direction),
    TogglePause,
    ToggleFullscreen,
    ToggleEffect(EffectToggle),
    TogglePerformanceMode,
    Restart,
    Quit,
}

impl InputEvent {
    /// Default key bindings
    pub fn from_key(key: Key) -> Option<Self> {
        let event = match key {
            Key::Up => Self::Direction(Direction::Up),
            Key::Down => Self::Direction(Direction::Down),
            Key::Left => Self::Direction(Direction::Left),
            Key::Right => Self::Direction(Direction::Right),
            Key::Space => Self::TogglePause,
            Key::F11 => Self::ToggleFullscreen,
            Key::Escape => Self::Quit,
            Key::Char(c) => match c.to_ascii_lowercase() {
                'w' => Self::Direction(Direction::Up),
                's' => Self::Direction(Direction::Down),
                'a' => Self::Direction(Direction::Left),
                'd' => Self::Direction(Direction::Right),
                'f' => Self::ToggleFullscreen,
                'c' => Self::ToggleEffect(EffectToggle::Scanlines),
                'v' => Self::ToggleEffect(EffectToggle::Shake),
                'b' => Self::ToggleEffect(EffectToggle::Particles),
                't' => Self::ToggleEffect(EffectToggle::Trail),
                'g' => Self::ToggleEffect(EffectToggle::Ripples),
                'p' => Self::TogglePerformanceMode,
                'r' => Self::Restart,
                'q' => Self::Quit,
                _ => return None,
            },
        };
        Some(event)
    }
}

/// Caps the frame rate and measures frame time
#[derive(Debug)]
pub struct FrameLimiter {
    frame: Duration,
    last: Instant,
}

impl FrameLimiter {
    pub fn new(fps: u32) -> Self {
        Self {
            frame: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last: Instant::now(),
        }
    }

    /// Sleep out the rest of the frame; returns seconds since the previous call
    ///
    /// The result is clamped to the maximum frame delta.
    pub fn tick(&mut self) -> f32 {
        let elapsed = self.last.elapsed();
        if elapsed < self.frame {
            thread::sleep(self.frame - elapsed);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DT)
    }
}
