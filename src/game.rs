//! Frame driver
//!
//! One [`Game`] owns the match state plus everything around it. Each frame
//! runs input, simulation steps, effects, audio and the high score check in
//! that order; the renderer then reads a [`FrameSnapshot`].

use std::path::PathBuf;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{AudioEngine, SoundEffect};
use crate::highscores::HighScoreStore;
use crate::platform::InputEvent;
use crate::renderer::FrameSnapshot;
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState};

/// Sound requested by a simulation event
pub fn sound_for(event: GameEvent) -> Option<SoundEffect> {
    let effect = match event {
        GameEvent::Turn(_) => SoundEffect::Turn,
        GameEvent::FruitEaten { .. } => SoundEffect::Fruit,
        GameEvent::BonusCollected { .. } => SoundEffect::Bonus,
        GameEvent::RippleEmitted => SoundEffect::Ripple,
        GameEvent::SpawnWarning(_) => SoundEffect::SpawnWarning,
        GameEvent::EnemySpawned(_) => SoundEffect::EnemySpawn,
        GameEvent::EnemiesDestroyed(0) => return None,
        GameEvent::EnemiesDestroyed(_) => SoundEffect::EnemyDestroy,
        GameEvent::GameOver { .. } => SoundEffect::GameOver,
    };
    Some(effect)
}

pub struct Game {
    state: GameState,
    audio: AudioEngine,
    settings: Settings,
    settings_path: Option<PathBuf>,
    highscores: HighScoreStore,
    /// Seeds for restarted matches
    run_rng: Pcg32,
    elapsed: f32,
}

impl Game {
    pub fn new(settings: Settings, highscores: HighScoreStore, audio: AudioEngine, seed: u64) -> Self {
        log::info!("Starting match with seed {}", seed);
        Self {
            state: GameState::with_effects(seed, settings.effects),
            audio,
            settings,
            settings_path: None,
            highscores,
            run_rng: Pcg32::seed_from_u64(seed.rotate_left(17) ^ 0x9e37_79b9),
            elapsed: 0.0,
        }
    }

    /// Persist settings changes to `path`
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn best_score(&self) -> u64 {
        self.highscores.best()
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.audio
    }

    /// Seconds of frame time fed in so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Apply this frame's intents in order; false means quit
    pub fn handle_events(&mut self, events: &[InputEvent]) -> bool {
        for &event in events {
            match event {
                InputEvent::Quit => return false,
                InputEvent::ToggleFullscreen => {
                    self.settings.fullscreen = !self.settings.fullscreen;
                    self.save_settings();
                }
                _ if self.state.phase == GamePhase::GameOver => {
                    if event == InputEvent::Restart {
                        self.restart();
                    }
                }
                InputEvent::Restart => {}
                InputEvent::TogglePause => sim::toggle_pause(&mut self.state),
                InputEvent::ToggleEffect(toggle) => {
                    let on = self.settings.toggle_effect(toggle);
                    log::debug!("{:?} effect {}", toggle, if on { "on" } else { "off" });
                    self.sync_effects();
                }
                InputEvent::TogglePerformanceMode => {
                    let on = self.settings.toggle_performance_mode();
                    log::info!("Performance mode {}", if on { "on" } else { "off" });
                    self.sync_effects();
                }
                InputEvent::Direction(dir) => sim::queue_direction(&mut self.state, dir),
            }
        }
        true
    }

    /// Advance one frame of real time
    pub fn update(&mut self, dt: f32) {
        sim::advance(&mut self.state, dt);
        self.elapsed += dt.max(0.0);

        for event in self.state.drain_events() {
            if let Some(effect) = sound_for(event) {
                self.audio.play(effect);
            }
        }
        if self.state.score > self.highscores.best() {
            self.highscores.record(self.state.score);
        }
        self.audio.update();
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot::capture(&self.state, self.highscores.best(), self.settings.fullscreen)
    }

    /// Fresh match; enemies, telegraphs and effects are dropped with the old one
    pub fn restart(&mut self) {
        let seed: u64 = self.run_rng.random();
        log::info!("Restarting with seed {}", seed);
        self.state = GameState::with_effects(seed, self.settings.effects);
    }

    fn sync_effects(&mut self) {
        self.state.fx = self.settings.effects;
        if !self.state.fx.shake {
            self.state.shake.clear();
        }
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Some(path) = &self.settings_path {
            self.settings.save(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullBackend;
    use crate::sim::{Direction, EffectToggle, EffectToggles};
    use glam::IVec2;

    fn game_in(dir: &tempfile::TempDir) -> Game {
        let audio = AudioEngine::new(Ok(Box::new(NullBackend::new(4))), 8_000, 0.45, 1);
        let highscores = HighScoreStore::load(dir.path().join("highscore.txt"));
        Game::new(Settings::default(), highscores, audio, 42)
            .with_settings_path(dir.path().join("settings.json"))
    }

    #[test]
    fn test_every_event_has_a_sound() {
        assert_eq!(sound_for(GameEvent::RippleEmitted), Some(SoundEffect::Ripple));
        assert_eq!(
            sound_for(GameEvent::GameOver { score: 3 }),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(sound_for(GameEvent::EnemiesDestroyed(0)), None);
        assert_eq!(
            sound_for(GameEvent::EnemiesDestroyed(2)),
            Some(SoundEffect::EnemyDestroy)
        );
        assert_eq!(
            sound_for(GameEvent::Turn(Direction::Up)),
            Some(SoundEffect::Turn)
        );
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        assert!(game.handle_events(&[InputEvent::Direction(Direction::Up)]));
        assert!(!game.handle_events(&[InputEvent::Quit, InputEvent::TogglePause]));
        assert_eq!(game.state().phase, GamePhase::Running);
    }

    #[test]
    fn test_pause_is_ignored_after_game_over() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        sim::game_over(&mut game.state);
        game.handle_events(&[InputEvent::TogglePause]);
        assert_eq!(game.state().phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_only_honours_restart_and_fullscreen() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        sim::game_over(&mut game.state);
        game.handle_events(&[
            InputEvent::ToggleEffect(EffectToggle::Trail),
            InputEvent::TogglePerformanceMode,
            InputEvent::ToggleFullscreen,
        ]);
        assert!(game.settings().effects.trail);
        assert!(!game.settings().performance_mode);
        assert!(game.settings().fullscreen);

        let old_seed = game.state().seed;
        game.handle_events(&[InputEvent::Restart]);
        assert_eq!(game.state().phase, GamePhase::Running);
        assert_ne!(game.state().seed, old_seed);
        assert!(game.state().enemies.is_empty());
    }

    #[test]
    fn test_restart_is_ignored_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        let seed = game.state().seed;
        game.handle_events(&[InputEvent::Restart]);
        assert_eq!(game.state().seed, seed);
    }

    #[test]
    fn test_shake_toggle_clears_active_shake() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        game.state.shake.start(6.0, 0.35);
        game.handle_events(&[InputEvent::ToggleEffect(EffectToggle::Shake)]);
        assert_eq!(game.state().shake.strength(), 0.0);
        assert!(!game.state().fx.shake);

        // The choice is persisted
        let saved = Settings::load(&dir.path().join("settings.json"));
        assert!(!saved.effects.shake);
    }

    #[test]
    fn test_performance_mode_reaches_the_simulation() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        game.handle_events(&[InputEvent::TogglePerformanceMode]);
        assert_eq!(game.state().fx, EffectToggles::all(false));
        game.handle_events(&[InputEvent::TogglePerformanceMode]);
        assert_eq!(game.state().fx, EffectToggles::all(true));
    }

    #[test]
    fn test_new_best_is_saved_during_play() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        let head = game.state().snake.head();
        game.state.fruit.cell = head + IVec2::X;
        game.update(0.1);
        assert_eq!(game.state().score, 10);
        assert_eq!(game.best_score(), 10);
        assert!(game.state().events.is_empty());

        let stored = HighScoreStore::load(dir.path().join("highscore.txt"));
        assert_eq!(stored.best(), 10);
        assert_eq!(game.snapshot().best, 10);
    }

    #[test]
    fn test_paused_frames_do_not_move_the_snake() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(&dir);
        game.handle_events(&[InputEvent::TogglePause]);
        let head = game.state().snake.head();
        for _ in 0..10 {
            game.update(0.1);
        }
        assert_eq!(game.state().snake.head(), head);
        assert_eq!(game.state().phase, GamePhase::Paused);
    }
}
