//! Data-driven game balance
//!
//! Every number the simulation uses lives in [`Tuning`]. Defaults match
//! [`crate::consts`]; a JSON document can override any subset of fields.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Side;

/// Playfield size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleTuning {
    pub width: f32,
    pub height: f32,
    /// Player paddle speed (units/s)
    pub speed: f32,
    pub margin: f32,
    pub velocity_decay: f32,
}

impl Default for PaddleTuning {
    fn default() -> Self {
        Self {
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
            margin: PADDLE_MARGIN,
            velocity_decay: PADDLE_VELOCITY_DECAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallTuning {
    /// Diameter
    pub size: f32,
    pub initial_speed: f32,
    pub max_speed: f32,
    pub speed_increase: f32,
    pub margin: f32,
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            size: BALL_SIZE,
            initial_speed: BALL_INITIAL_SPEED,
            max_speed: BALL_MAX_SPEED,
            speed_increase: BALL_SPEED_INCREASE,
            margin: BALL_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub winning_score: u32,
    pub serve_delay: f32,
    pub collision_tolerance: f32,
    pub paddle_separation: f32,
    pub max_dt: f32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            winning_score: WINNING_SCORE,
            serve_delay: SERVE_DELAY,
            collision_tolerance: COLLISION_TOLERANCE,
            paddle_separation: PADDLE_SEPARATION,
            max_dt: MAX_DT,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub paddle: PaddleTuning,
    pub ball: BallTuning,
    pub game: GameTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Tuning>(json) {
            Ok(tuning) => Some(tuning.sanitized()),
            Err(e) => {
                log::warn!("Ignoring invalid tuning: {}", e);
                None
            }
        }
    }

    /// Repair values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        if !self.geometry_fits() {
            log::warn!(
                "Tuning geometry doesn't fit a {}x{} arena, using default sizes",
                self.arena.width,
                self.arena.height
            );
            self.arena = ArenaTuning::default();
            let defaults = PaddleTuning::default();
            self.paddle.width = defaults.width;
            self.paddle.height = defaults.height;
            self.paddle.margin = defaults.margin;
            self.ball.size = BALL_SIZE;
            self.ball.margin = BALL_MARGIN;
        }
        if self.game.winning_score == 0 {
            log::warn!("winning_score must be at least 1, using {}", WINNING_SCORE);
            self.game.winning_score = WINNING_SCORE;
        }
        if !is_positive(self.game.max_dt) {
            self.game.max_dt = MAX_DT;
        }
        if !is_positive(self.ball.initial_speed) {
            self.ball.initial_speed = BALL_INITIAL_SPEED;
        }
        if self.ball.max_speed < self.ball.initial_speed {
            log::warn!(
                "ball max_speed {} below initial_speed {}, raising it",
                self.ball.max_speed,
                self.ball.initial_speed
            );
            self.ball.max_speed = self.ball.initial_speed;
        }
        self.ball.speed_increase = self.ball.speed_increase.max(0.0);
        self.game.serve_delay = self.game.serve_delay.max(0.0);
        self
    }

    /// Positive sizes, both paddles inside the arena without touching, and
    /// room for the ball between its wall margins
    fn geometry_fits(&self) -> bool {
        let sizes = [
            self.arena.width,
            self.arena.height,
            self.paddle.width,
            self.paddle.height,
            self.ball.size,
        ];
        if !sizes.into_iter().all(is_positive) {
            return false;
        }
        let margins = [self.paddle.margin, self.ball.margin];
        if !margins.into_iter().all(|m| m.is_finite() && m >= 0.0) {
            return false;
        }
        self.paddle.height + 2.0 * self.paddle.margin <= self.arena.height
            && 2.0 * (self.paddle.width + self.paddle.margin) < self.arena.width
            && 2.0 * self.ball.margin < self.arena.height
    }

    /// Centre of the playfield
    pub fn center(&self) -> Vec2 {
        crate::field_center(self.arena.width, self.arena.height)
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball.size / 2.0
    }

    /// Highest y the ball centre may reach (top wall)
    pub fn ball_top(&self) -> f32 {
        self.ball.margin
    }

    /// Lowest y the ball centre may reach (bottom wall)
    pub fn ball_bottom(&self) -> f32 {
        self.arena.height - self.ball.margin
    }

    /// Smallest legal paddle centre y
    pub fn paddle_min_y(&self) -> f32 {
        self.paddle.margin + self.paddle.height / 2.0
    }

    /// Largest legal paddle centre y
    pub fn paddle_max_y(&self) -> f32 {
        self.arena.height - self.paddle.margin - self.paddle.height / 2.0
    }

    /// Clamp a paddle centre y to the playfield
    pub fn clamp_paddle_y(&self, y: f32) -> f32 {
        y.max(self.paddle_min_y()).min(self.paddle_max_y())
    }

    /// Fixed x of a paddle centre
    pub fn paddle_x(&self, side: Side) -> f32 {
        match side {
            Side::Player => self.paddle.margin + self.paddle.width / 2.0,
            Side::Ai => self.arena.width - self.paddle.margin - self.paddle.width / 2.0,
        }
    }

    /// Fraction of the speed ramp used so far (0.0 - 1.0)
    pub fn speed_progress(&self, speed: f32) -> f32 {
        let span = self.ball.max_speed - self.ball.initial_speed;
        if span <= 0.0 {
            return 1.0;
        }
        ((speed - self.ball.initial_speed) / span).clamp(0.0, 1.0)
    }
}

/// False for NaN as well as zero and negatives
fn is_positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}
