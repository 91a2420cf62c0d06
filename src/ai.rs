//! Computer opponent
//!
//! The AI never looks ahead more than one wall bounce. It only re-aims when
//! the ball is heading its way, no more often than its reaction time allows,
//! and its aim is spoiled by random error and the occasional deliberate miss.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Ball, Paddle};
use crate::tuning::Tuning;

/// Named skill tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// Balance numbers for this tier
    pub fn profile(&self) -> AiProfile {
        match self {
            Difficulty::Easy => AiProfile {
                speed_multiplier: 0.3,
                reaction_time: 0.3,
                accuracy: 0.3,
                error_range: 80.0,
                centering_speed: 0.15,
                miss_chance: 0.4,
            },
            Difficulty::Medium => AiProfile {
                speed_multiplier: 0.5,
                reaction_time: 0.15,
                accuracy: 0.6,
                error_range: 40.0,
                centering_speed: 0.25,
                miss_chance: 0.2,
            },
            Difficulty::Hard => AiProfile {
                speed_multiplier: 0.7,
                reaction_time: 0.08,
                accuracy: 0.8,
                error_range: 20.0,
                centering_speed: 0.4,
                miss_chance: 0.1,
            },
            Difficulty::Expert => AiProfile {
                speed_multiplier: 0.85,
                reaction_time: 0.05,
                accuracy: 0.9,
                error_range: 10.0,
                centering_speed: 0.6,
                miss_chance: 0.05,
            },
        }
    }
}

/// Skill knobs for the opponent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Scales how far the aim point may move per decision
    pub speed_multiplier: f32,
    /// Minimum seconds between decisions
    pub reaction_time: f32,
    /// Above 0.6 the AI predicts the wall bounce
    pub accuracy: f32,
    /// Width of the uniform aim error
    pub error_range: f32,
    /// Paddle interpolation factor toward the aim point
    pub centering_speed: f32,
    /// Probability of aiming away on purpose
    pub miss_chance: f32,
}

/// Decision maker for the AI paddle
pub trait AiStrategy {
    fn difficulty(&self) -> Difficulty;

    fn set_difficulty(&mut self, difficulty: Difficulty);

    fn profile(&self) -> &AiProfile;

    /// Forget per-match memory
    fn reset(&mut self) {}

    /// Observe the ball and update the paddle's aim point
    fn update(
        &mut self,
        paddle: &mut Paddle,
        ball: &Ball,
        tuning: &Tuning,
        now: f64,
        rng: &mut Pcg32,
    );
}

/// One observation of the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSample {
    pub pos: Vec2,
    pub vel: Vec2,
    pub time: f64,
}

/// Most recent samples kept
pub const HISTORY_SIZE: usize = 10;

/// How far into the table (as a fraction of its width) the ball must be
/// before the AI reacts
const REACTION_LINE: f32 = 0.4;
/// Extra inset from the paddle bounds for normal aim points
const SAFE_INSET: f32 = 20.0;
/// Aim point travel per decision at speed multiplier 1.0
const MAX_AIM_CHANGE: f32 = 150.0;
/// Within this distance of centre the paddle stops drifting back
const CENTER_DEAD_ZONE: f32 = 30.0;
const CENTER_DRIFT: f32 = 0.05;
/// Shortest look-ahead used for prediction (seconds)
const MIN_LOOKAHEAD: f32 = 0.2;

/// The stock opponent
#[derive(Debug, Clone)]
pub struct HeuristicAi {
    difficulty: Difficulty,
    profile: AiProfile,
    last_decision: Option<f64>,
    history: VecDeque<BallSample>,
}

impl Default for HeuristicAi {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

impl HeuristicAi {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: difficulty.profile(),
            last_decision: None,
            history: VecDeque::with_capacity(HISTORY_SIZE + 1),
        }
    }

    /// Replace the balance numbers without changing the tier label
    pub fn set_profile(&mut self, profile: AiProfile) {
        self.profile = profile;
    }

    /// Recent ball observations, oldest first
    pub fn history(&self) -> impl Iterator<Item = &BallSample> {
        self.history.iter()
    }

    fn record(&mut self, ball: &Ball, now: f64) {
        self.history.push_back(BallSample {
            pos: ball.pos,
            vel: ball.vel,
            time: now,
        });
        while self.history.len() > HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    fn can_react(&self, now: f64) -> bool {
        match self.last_decision {
            None => true,
            Some(t) => now - t > self.profile.reaction_time as f64,
        }
    }

    fn decide(&self, paddle: &mut Paddle, ball: &Ball, tuning: &Tuning, rng: &mut Pcg32) {
        if rng.random::<f32>() < self.profile.miss_chance {
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let offset = 100.0 + rng.random::<f32>() * 150.0;
            paddle.target_y = tuning.clamp_paddle_y(ball.pos.y + sign * offset);
            log::trace!("AI misses on purpose, aiming at {:.1}", paddle.target_y);
            return;
        }

        let mut target = if self.profile.accuracy > 0.6 {
            predict_ball_y(ball, paddle.x, tuning)
        } else {
            ball.pos.y
        };

        target += (rng.random::<f32>() - 0.5) * self.profile.error_range;

        let lo = tuning.paddle_min_y() + SAFE_INSET;
        let hi = tuning.paddle_max_y() - SAFE_INSET;
        target = target.max(lo).min(hi);

        let max_change = MAX_AIM_CHANGE * self.profile.speed_multiplier;
        target = target
            .max(paddle.target_y - max_change)
            .min(paddle.target_y + max_change);

        log::trace!("AI aims at {:.1} (ball y {:.1})", target, ball.pos.y);
        paddle.target_y = target;
    }

    fn return_to_center(paddle: &mut Paddle, tuning: &Tuning) {
        let diff = tuning.center().y - paddle.y;
        if diff.abs() > CENTER_DEAD_ZONE {
            paddle.target_y = paddle.y + diff * CENTER_DRIFT;
        }
    }
}

impl AiStrategy for HeuristicAi {
    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.profile = difficulty.profile();
    }

    fn profile(&self) -> &AiProfile {
        &self.profile
    }

    fn reset(&mut self) {
        self.last_decision = None;
        self.history.clear();
    }

    fn update(
        &mut self,
        paddle: &mut Paddle,
        ball: &Ball,
        tuning: &Tuning,
        now: f64,
        rng: &mut Pcg32,
    ) {
        self.record(ball, now);

        let incoming = ball.vel.x > 0.0 && ball.pos.x > tuning.arena.width * REACTION_LINE;

        if incoming {
            if self.can_react(now) {
                self.decide(paddle, ball, tuning, rng);
                self.last_decision = Some(now);
            }
        } else {
            Self::return_to_center(paddle, tuning);
        }
    }
}

/// Where the ball will cross `paddle_x`, allowing one wall bounce
///
/// Linear extrapolation over `dx / |vx|` seconds (never less than 0.2 s, so
/// a stalled or passing ball still gives a finite answer), mirrored once off
/// whichever wall it overshoots.
pub fn predict_ball_y(ball: &Ball, paddle_x: f32, tuning: &Tuning) -> f32 {
    let speed_x = ball.vel.x.abs();
    let time_to_reach = if speed_x > f32::EPSILON {
        ((paddle_x - ball.pos.x) / speed_x).max(MIN_LOOKAHEAD)
    } else {
        MIN_LOOKAHEAD
    };

    let mut predicted = ball.pos.y + ball.vel.y * time_to_reach;

    let top = tuning.ball_top();
    let bottom = tuning.ball_bottom();
    if predicted < top {
        predicted = top + (top - predicted);
    } else if predicted > bottom {
        predicted = bottom - (predicted - bottom);
    }

    predicted.max(top).min(bottom)
}
