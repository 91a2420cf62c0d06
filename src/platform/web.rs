//! Browser binding
//!
//! A JS page owns the canvas, the DOM overlays and the animation frame loop;
//! it forwards keyboard events here, calls [`WebMatch::frame`] once per
//! frame and draws from the getters.

use wasm_bindgen::prelude::*;

use super::input::KeyState;
use super::timing::FrameTimer;
use crate::ai::{AiStrategy, Difficulty, HeuristicAi};
use crate::audio::AudioManager;
use crate::settings::Settings;
use crate::sim::{FrameClock, GamePhase, Match, Side};
use crate::tuning::Tuning;

/// Install the console logger and panic hook. Called once by the page.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Ping Pong module loaded");
}

#[wasm_bindgen]
pub struct WebMatch {
    game: Match<HeuristicAi, AudioManager, FrameClock>,
    keys: KeyState,
    settings: Settings,
    timer: FrameTimer,
}

#[wasm_bindgen]
impl WebMatch {
    /// `settings_json` may be empty; bad JSON falls back to defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> WebMatch {
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).unwrap_or_default()
        };

        let seed = js_sys::Date::now() as u64;
        let mut audio = AudioManager::new();
        audio.set_volume(settings.volume_fraction());

        let game = Match::new(
            Tuning::default(),
            HeuristicAi::new(settings.difficulty),
            audio,
            FrameClock::default(),
            seed,
        );
        log::info!("Match created with seed: {}", seed);

        WebMatch {
            game,
            keys: KeyState::new(),
            settings,
            timer: FrameTimer::new(),
        }
    }

    // === Input ===

    /// Returns true when the page should `preventDefault()` the event
    pub fn key_down(&mut self, code: &str) -> bool {
        self.keys.key_down(code)
    }

    pub fn key_up(&mut self, code: &str) {
        self.keys.key_up(code);
    }

    /// Window blurred or tab hidden: drop held keys and pause
    pub fn focus_lost(&mut self) {
        self.keys.clear();
        self.timer.reset();
        if self.game.pause() {
            log::info!("Auto-paused (focus lost)");
        }
    }

    /// Advance one animation frame. `timestamp_ms` is the
    /// `requestAnimationFrame` timestamp.
    pub fn frame(&mut self, timestamp_ms: f64) {
        let dt = self.timer.tick(timestamp_ms);
        let input = self.keys.tick_input();
        self.game.update(dt, &input);
    }

    // === Lifecycle ===

    pub fn start(&mut self) {
        self.game.sink().resume();
        self.game.start();
    }

    pub fn pause(&mut self) -> bool {
        self.game.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.game.resume()
    }

    pub fn back_to_menu(&mut self) {
        self.game.back_to_menu();
    }

    // === Settings ===

    /// Unknown names are ignored with a warning
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        match Difficulty::from_str(name) {
            Some(difficulty) => {
                self.settings.difficulty = difficulty;
                self.game.set_difficulty(difficulty);
                true
            }
            None => {
                log::warn!("Unknown difficulty: {}", name);
                false
            }
        }
    }

    pub fn difficulty(&self) -> String {
        self.game.ai().difficulty().as_str().to_string()
    }

    /// Volume slider, 0 - 100
    pub fn set_volume(&mut self, volume: u8) {
        self.settings.set_volume(volume);
        let fraction = self.settings.volume_fraction();
        self.game.sink_mut().set_volume(fraction);
    }

    pub fn set_trails(&mut self, enabled: bool) {
        self.settings.trails = enabled;
    }

    pub fn set_reduced_motion(&mut self, enabled: bool) {
        self.settings.reduced_motion = enabled;
    }

    pub fn settings_json(&self) -> String {
        self.settings.to_json()
    }

    // === Render state ===

    /// One of `idle`, `running`, `paused`, `ended`
    pub fn phase(&self) -> String {
        self.game.phase().as_str().to_string()
    }

    pub fn is_running(&self) -> bool {
        self.game.phase() == GamePhase::Running
    }

    pub fn width(&self) -> f32 {
        self.game.tuning().arena.width
    }

    pub fn height(&self) -> f32 {
        self.game.tuning().arena.height
    }

    pub fn player_score(&self) -> u32 {
        self.game.state().player_score
    }

    pub fn ai_score(&self) -> u32 {
        self.game.state().ai_score
    }

    /// Match clock as `MM:SS`
    pub fn elapsed_text(&self) -> String {
        crate::format_time(self.game.state().elapsed)
    }

    pub fn ball_x(&self) -> f32 {
        self.game.ball().pos.x
    }

    pub fn ball_y(&self) -> f32 {
        self.game.ball().pos.y
    }

    pub fn ball_radius(&self) -> f32 {
        self.game.ball().radius
    }

    pub fn ball_in_play(&self) -> bool {
        self.game.ball().in_play
    }

    /// 0.0 at serve speed, 1.0 at max speed
    pub fn ball_glow(&self) -> f32 {
        self.game.ball().glow
    }

    /// Flat `[x, y, alpha, ...]`, newest first; empty when trails are off
    pub fn trail(&self) -> Vec<f32> {
        if !self.settings.trails {
            return Vec::new();
        }
        self.game
            .ball()
            .trail
            .iter()
            .flat_map(|t| [t.pos.x, t.pos.y, t.alpha])
            .collect()
    }

    /// Flat `[x, y, alpha, size, ...]`
    pub fn particles(&self) -> Vec<f32> {
        self.game
            .ball()
            .particles
            .iter()
            .flat_map(|p| [p.pos.x, p.pos.y, p.alpha, p.size])
            .collect()
    }

    /// Centre y of the player paddle
    pub fn player_y(&self) -> f32 {
        self.game.paddle(Side::Player).y
    }

    pub fn ai_y(&self) -> f32 {
        self.game.paddle(Side::Ai).y
    }

    pub fn paddle_x(&self, ai: bool) -> f32 {
        let side = if ai { Side::Ai } else { Side::Player };
        self.game.paddle(side).x
    }

    pub fn paddle_width(&self) -> f32 {
        self.game.tuning().paddle.width
    }

    pub fn paddle_height(&self) -> f32 {
        self.game.tuning().paddle.height
    }

    /// Current shake offset magnitude; zero when the player opted out
    pub fn screen_shake(&self) -> f32 {
        if self.settings.effective_screen_shake() {
            self.game.state().screen_shake
        } else {
            0.0
        }
    }

    pub fn speed_progress(&self) -> f32 {
        self.game.speed_progress()
    }

    /// Events since the last call, as a JSON array
    pub fn events_json(&mut self) -> String {
        let events = self.game.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Failed to serialise events: {}", e);
            "[]".to_string()
        })
    }

    /// Final result as JSON, or an empty string before the match has ended
    pub fn summary_json(&self) -> String {
        self.game
            .summary()
            .and_then(|s| serde_json::to_string(&s).ok())
            .unwrap_or_default()
    }
}
