//! Neon Snake headless runner
//!
//! Drives the full frame loop (input, steps, effects, audio, snapshot) with
//! the demo autopilot at the capped frame rate, then exits.

use std::time::Instant;

use neon_snake::audio::{AudioBackend, AudioEngine, AudioError};
use neon_snake::consts::FPS;
use neon_snake::persistence::DataPaths;
use neon_snake::platform::{Autopilot, FrameLimiter, InputEvent};
use neon_snake::renderer::{HeadlessRenderer, Renderer};
use neon_snake::sim::GamePhase;
use neon_snake::{Game, HighScoreStore, Settings};

const DEFAULT_DEMO_SECONDS: f32 = 20.0;
/// Pause on the game over screen before the autopilot restarts
const RESTART_DELAY: f32 = 1.5;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(feature = "playback")]
fn open_backend(voices: usize) -> Result<Box<dyn AudioBackend>, AudioError> {
    neon_snake::audio::RodioBackend::open(voices).map(|b| Box::new(b) as Box<dyn AudioBackend>)
}

#[cfg(not(feature = "playback"))]
fn open_backend(voices: usize) -> Result<Box<dyn AudioBackend>, AudioError> {
    log::info!("Built without playback; mixing into a silent backend");
    Ok(Box::new(neon_snake::audio::NullBackend::new(voices)))
}

fn main() {
    env_logger::init();
    log::info!("Neon Snake (headless) starting...");

    let paths = DataPaths::from_env();
    log::info!("Data directory: {}", paths.data_dir.display());
    let settings = Settings::load(&paths.settings_file);
    let highscores = HighScoreStore::load(&paths.highscore_file);

    let seed = env_parse::<u64>("NEON_SNAKE_SEED").unwrap_or_else(rand::random);
    let demo_seconds = env_parse::<f32>("NEON_SNAKE_DEMO_SECONDS")
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(DEFAULT_DEMO_SECONDS);

    let audio = if settings.audio_enabled {
        AudioEngine::new(
            open_backend(settings.voice_count),
            settings.sample_rate,
            settings.master_sfx_volume,
            seed,
        )
    } else {
        log::info!("Audio disabled in settings");
        AudioEngine::disabled()
    };

    let mut game = Game::new(settings, highscores, audio, seed)
        .with_settings_path(paths.settings_file.clone());
    let mut renderer = HeadlessRenderer::new(2.0);
    let autopilot = Autopilot;
    let mut limiter = FrameLimiter::new(FPS);
    let started = Instant::now();
    let mut over_for = 0.0_f32;

    loop {
        let dt = limiter.tick();

        let mut events = Vec::new();
        if started.elapsed().as_secs_f32() >= demo_seconds {
            events.push(InputEvent::Quit);
        }
        match game.state().phase {
            GamePhase::GameOver => {
                over_for += dt;
                if over_for >= RESTART_DELAY {
                    events.push(InputEvent::Restart);
                    over_for = 0.0;
                }
            }
            _ => {
                let pending = game.state().snake.pending;
                if let Some(dir) = autopilot.steer(game.state()).filter(|&d| d != pending) {
                    events.push(InputEvent::Direction(dir));
                }
            }
        }
        if !game.handle_events(&events) {
            break;
        }

        game.update(dt);
        renderer.render(&game.snapshot(), game.elapsed());
    }

    log::info!(
        "Demo finished after {} frames - score {}, best {}",
        renderer.frames(),
        game.state().score,
        game.best_score()
    );
}
