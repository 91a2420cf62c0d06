//! Ping Pong - arcade Pong against a tunable AI opponent
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (ball, paddles, collisions, match flow)
//! - `ai`: Heuristic opponent with difficulty profiles
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `audio`: Tone synthesis for impact signals
//! - `platform`: Browser/native platform abstraction

pub mod ai;
pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use ai::{AiProfile, AiStrategy, Difficulty, HeuristicAi};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest simulation step accepted per frame (seconds)
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 12.0;
    pub const PADDLE_HEIGHT: f32 = 80.0;
    pub const PADDLE_SPEED: f32 = 600.0;
    /// Gap kept between a paddle and the top/bottom edge (and the side wall)
    pub const PADDLE_MARGIN: f32 = 15.0;
    /// Player paddle velocity multiplier applied after every step
    pub const PADDLE_VELOCITY_DECAY: f32 = 0.9;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 12.0;
    pub const BALL_INITIAL_SPEED: f32 = 350.0;
    pub const BALL_MAX_SPEED: f32 = 650.0;
    /// Added to ball speed on every paddle hit
    pub const BALL_SPEED_INCREASE: f32 = 15.0;
    /// Wall bound for the ball centre, also the off-screen scoring margin
    pub const BALL_MARGIN: f32 = 8.0;

    /// Match rules
    pub const WINNING_SCORE: u32 = 5;
    /// Delay between a point and the next serve (seconds)
    pub const SERVE_DELAY: f32 = 1.5;
    /// Bounding box slack for ball/paddle contact
    pub const COLLISION_TOLERANCE: f32 = 3.0;
    /// Extra distance the ball is pushed off a paddle after a hit
    pub const PADDLE_SEPARATION: f32 = 3.0;
}

/// The centre of a playfield of the given size
#[inline]
pub fn field_center(width: f32, height: f32) -> Vec2 {
    Vec2::new(width / 2.0, height / 2.0)
}

/// Format elapsed seconds as `MM:SS`
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}
