//! Match state and core simulation types
//!
//! Entities (ball, paddles) and the score/phase bookkeeping the match
//! controller mutates each tick.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_8};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, rescale};
use crate::format_time;
use crate::tuning::{BallTuning, Tuning};

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// No match in progress (menus)
    Idle,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Someone reached the winning score
    Ended,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::Ended => "ended",
        }
    }
}

/// Which end of the table a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Human player, left edge
    Player,
    /// Computer opponent, right edge
    Ai,
}

impl Side {
    /// Horizontal sign of travel toward this side
    pub fn toward(&self) -> f32 {
        match self {
            Side::Player => -1.0,
            Side::Ai => 1.0,
        }
    }

    /// Horizontal sign of travel away from this side
    pub fn away(&self) -> f32 {
        -self.toward()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Ai => "ai",
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }
}

/// Player paddle command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveDir {
    Up,
    Down,
    #[default]
    Stop,
}

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 20;

/// A cosmetic spark thrown off an impact
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    pub size: f32,
}

/// Sparks per impact
pub const IMPACT_PARTICLES: usize = 8;
/// Maximum particles
pub const MAX_PARTICLES: usize = 256;
const PARTICLE_LIFE: f32 = 0.5;
const PARTICLE_SPEED: f32 = 200.0;

/// The ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Scalar speed, always `vel.length()` while in play
    pub speed: f32,
    pub radius: f32,
    /// False between a point and the next serve
    pub in_play: bool,
    /// 0.0 at serve speed, 1.0 at max speed
    pub glow: f32,
    /// Trail history for rendering (newest first)
    pub trail: Vec<TrailPoint>,
    pub particles: Vec<Particle>,
}

impl Ball {
    /// A parked ball at the centre of the table
    pub fn new(tuning: &Tuning) -> Self {
        let mut ball = Self {
            pos: tuning.center(),
            vel: Vec2::ZERO,
            speed: tuning.ball.initial_speed,
            radius: tuning.ball_radius(),
            in_play: false,
            glow: 0.0,
            trail: Vec::with_capacity(TRAIL_LENGTH),
            particles: Vec::new(),
        };
        ball.park(tuning);
        ball
    }

    /// Serve from the centre toward `toward`
    ///
    /// Launch angle is 22.5°-45° off horizontal, tilted up or down at random.
    pub fn reset(&mut self, toward: Side, tuning: &Tuning, rng: &mut Pcg32) {
        self.pos = tuning.center();
        self.speed = tuning.ball.initial_speed;

        let magnitude = rng.random_range(FRAC_PI_8..=FRAC_PI_4);
        let angle = if rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        };

        self.vel = Vec2::new(
            angle.cos() * self.speed * toward.toward(),
            angle.sin() * self.speed,
        );
        self.in_play = true;
        self.glow = 0.0;
        self.trail.clear();
        self.particles.clear();
    }

    /// Take the ball out of play and hold it at the centre
    pub fn park(&mut self, tuning: &Tuning) {
        self.pos = tuning.center();
        self.vel = Vec2::ZERO;
        self.speed = tuning.ball.initial_speed;
        self.in_play = false;
        self.glow = 0.0;
        self.trail.clear();
    }

    /// Integrate one step and bounce off the top/bottom walls
    ///
    /// Returns the impact point when the ball hit a wall this step.
    pub fn step(&mut self, dt: f32, tuning: &Tuning) -> Option<Vec2> {
        self.record_trail();

        self.pos += self.vel * dt;

        let top = tuning.ball_top();
        let bottom = tuning.ball_bottom();
        let impact = if self.pos.y <= top {
            self.pos.y = top;
            self.vel.y = self.vel.y.abs();
            Some(Vec2::new(self.pos.x, top))
        } else if self.pos.y >= bottom {
            self.pos.y = bottom;
            self.vel.y = -self.vel.y.abs();
            Some(Vec2::new(self.pos.x, bottom))
        } else {
            None
        };

        self.update_particles(dt);
        self.glow = tuning.speed_progress(self.speed);

        impact
    }

    /// Speed up after a paddle hit, capped at the maximum
    pub fn accelerate(&mut self, tuning: &BallTuning) {
        if self.speed < tuning.max_speed {
            self.speed = (self.speed + tuning.speed_increase).min(tuning.max_speed);
        }
        self.vel = rescale(self.vel, self.speed);
    }

    /// Throw sparks from an impact point
    pub fn spawn_impact(&mut self, point: Vec2, rng: &mut Pcg32) {
        for _ in 0..IMPACT_PARTICLES {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * PARTICLE_SPEED,
                (rng.random::<f32>() - 0.5) * PARTICLE_SPEED,
            );
            self.particles.push(Particle {
                pos: point,
                vel,
                life: PARTICLE_LIFE,
                max_life: PARTICLE_LIFE,
                alpha: 1.0,
                size: rng.random::<f32>() * 3.0 + 1.0,
            });
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.radius))
    }

    fn record_trail(&mut self) {
        let point = TrailPoint {
            pos: self.pos,
            alpha: 1.0,
        };
        self.trail.insert(0, point);
        self.trail.truncate(TRAIL_LENGTH);

        // Quadratic falloff toward the tail
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter_mut().enumerate() {
            let age = (len - i as f32) / len;
            point.alpha = age * age;
        }
    }

    fn update_particles(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel * dt;
            particle.life -= dt;
            particle.alpha = (particle.life / particle.max_life).max(0.0);
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}

/// A paddle
#[derive(Debug, Clone)]
pub struct Paddle {
    pub side: Side,
    /// Fixed horizontal centre
    pub x: f32,
    pub y: f32,
    /// Vertical velocity (player only)
    pub vy: f32,
    /// Position the AI is easing toward
    pub target_y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Fraction of the remaining distance to `target_y` covered per step
    pub smoothing: f32,
}

impl Paddle {
    pub fn new(side: Side, tuning: &Tuning) -> Self {
        let y = tuning.center().y;
        Self {
            side,
            x: tuning.paddle_x(side),
            y,
            vy: 0.0,
            target_y: y,
            width: tuning.paddle.width,
            height: tuning.paddle.height,
            speed: tuning.paddle.speed,
            smoothing: 0.1,
        }
    }

    /// Player input: full speed up/down, or stop
    pub fn set_velocity(&mut self, dir: MoveDir) {
        self.vy = match dir {
            MoveDir::Up => -self.speed,
            MoveDir::Down => self.speed,
            MoveDir::Stop => 0.0,
        };
    }

    /// Move one step; the result is always inside the playfield
    pub fn step(&mut self, dt: f32, tuning: &Tuning) {
        match self.side {
            Side::Player => {
                self.y += self.vy * dt;
                self.y = tuning.clamp_paddle_y(self.y);
                self.vy *= tuning.paddle.velocity_decay;
            }
            Side::Ai => {
                let diff = self.target_y - self.y;
                self.y += diff * self.smoothing;
                self.y = tuning.clamp_paddle_y(self.y);
            }
        }
    }

    /// Back to the middle, at rest
    pub fn recenter(&mut self, tuning: &Tuning) {
        self.y = tuning.center().y;
        self.vy = 0.0;
        self.target_y = self.y;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(
            Vec2::new(self.x, self.y),
            Vec2::new(self.width / 2.0, self.height / 2.0),
        )
    }
}

/// A pending serve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServeTimer {
    /// Match time the serve goes out
    pub fire_at: f32,
    pub toward: Side,
}

/// End-of-match report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winner: Side,
    pub player_score: u32,
    pub ai_score: u32,
    /// Seconds of play
    pub duration: f32,
    pub peak_speed: f32,
}

impl MatchSummary {
    pub fn duration_text(&self) -> String {
        format_time(self.duration)
    }
}

/// Something that happened during a tick, for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { phase: GamePhase },
    Served { toward: Side },
    WallImpact { x: f32, y: f32 },
    PaddleHit { side: Side, speed: f32 },
    PointScored {
        scorer: Side,
        player_score: u32,
        ai_score: u32,
    },
    MatchEnded { summary: MatchSummary },
}

/// Score, clock and phase of the current match
#[derive(Debug, Clone)]
pub struct MatchState {
    pub player_score: u32,
    pub ai_score: u32,
    /// Seconds spent running
    pub elapsed: f32,
    /// Fastest ball seen this match
    pub peak_speed: f32,
    pub phase: GamePhase,
    pub started: bool,
    pub serve: Option<ServeTimer>,
    /// Cosmetic screen shake intensity
    pub screen_shake: f32,
}

impl MatchState {
    pub fn new(initial_speed: f32) -> Self {
        Self {
            player_score: 0,
            ai_score: 0,
            elapsed: 0.0,
            peak_speed: initial_speed,
            phase: GamePhase::Idle,
            started: false,
            serve: None,
            screen_shake: 0.0,
        }
    }

    /// Clear scores and timers, keeping the phase
    pub fn reset(&mut self, initial_speed: f32) {
        let phase = self.phase;
        *self = Self::new(initial_speed);
        self.phase = phase;
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_score,
            Side::Ai => self.ai_score,
        }
    }

    pub fn award_point(&mut self, side: Side) {
        match side {
            Side::Player => self.player_score += 1,
            Side::Ai => self.ai_score += 1,
        }
    }

    /// The side that has reached `winning_score`, if any
    pub fn winner(&self, winning_score: u32) -> Option<Side> {
        if self.player_score >= winning_score {
            Some(Side::Player)
        } else if self.ai_score >= winning_score {
            Some(Side::Ai)
        } else {
            None
        }
    }

    /// Who receives the next serve: whoever is behind (the AI on a tie)
    pub fn trailing_side(&self) -> Side {
        if self.player_score < self.ai_score {
            Side::Player
        } else {
            Side::Ai
        }
    }

    pub fn add_screen_shake(&mut self, intensity: f32) {
        self.screen_shake = self.screen_shake.max(intensity);
    }

    pub fn decay_screen_shake(&mut self) {
        if self.screen_shake > 0.0 {
            self.screen_shake *= 0.9;
            if self.screen_shake < 0.1 {
                self.screen_shake = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::PointScored {
            scorer: Side::Ai,
            player_score: 1,
            ai_score: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"point_scored","scorer":"ai","player_score":1,"ai_score":2}"#
        );

        let phase = serde_json::to_string(&GameEvent::PhaseChanged {
            phase: GamePhase::Paused,
        })
        .unwrap();
        assert_eq!(phase, r#"{"kind":"phase_changed","phase":"paused"}"#);
    }

    fn live_ball(tuning: &Tuning, pos: Vec2, vel: Vec2) -> Ball {
        let mut ball = Ball::new(tuning);
        ball.pos = pos;
        ball.vel = vel;
        ball.speed = vel.length();
        ball.in_play = true;
        ball
    }

    #[test]
    fn test_top_wall_bounce() {
        let tuning = Tuning::default();
        let top = tuning.ball_top();
        let mut ball = live_ball(&tuning, Vec2::new(400.0, top), Vec2::new(0.0, -50.0));

        let impact = ball.step(1.0 / 60.0, &tuning);

        assert_eq!(ball.pos.y, top);
        assert_eq!(ball.vel.y, 50.0);
        assert_eq!(impact, Some(Vec2::new(400.0, top)));

        // Moving away now, no second impact
        assert!(ball.step(1.0 / 60.0, &tuning).is_none());
    }

    #[test]
    fn test_bottom_wall_bounce() {
        let tuning = Tuning::default();
        let bottom = tuning.ball_bottom();
        let start = Vec2::new(400.0, bottom - 1.0);
        let mut ball = live_ball(&tuning, start, Vec2::new(100.0, 300.0));

        assert!(ball.step(0.02, &tuning).is_some());
        assert_eq!(ball.pos.y, bottom);
        assert_eq!(ball.vel.y, -300.0);
        assert_eq!(ball.vel.x, 100.0);
    }

    #[test]
    fn test_accelerate_caps_and_keeps_direction() {
        let tuning = Tuning::default();
        let mut ball = live_ball(&tuning, Vec2::ZERO, Vec2::new(640.0, 0.0));
        ball.accelerate(&tuning.ball);
        assert_eq!(ball.speed, 650.0);
        assert!((ball.vel - Vec2::new(650.0, 0.0)).length() < 1e-3);

        ball.accelerate(&tuning.ball);
        assert_eq!(ball.speed, 650.0);
    }

    #[test]
    fn test_trail_is_bounded() {
        let tuning = Tuning::default();
        let mut ball = live_ball(&tuning, Vec2::new(400.0, 200.0), Vec2::new(10.0, 0.0));
        for _ in 0..50 {
            ball.step(0.01, &tuning);
        }
        assert_eq!(ball.trail.len(), TRAIL_LENGTH);
        assert!(ball.trail[0].alpha > ball.trail[TRAIL_LENGTH - 1].alpha);
    }

    #[test]
    fn test_particles_expire() {
        let tuning = Tuning::default();
        let mut ball = live_ball(&tuning, Vec2::new(400.0, 200.0), Vec2::new(10.0, 0.0));
        ball.spawn_impact(ball.pos, &mut rng(1));
        assert_eq!(ball.particles.len(), IMPACT_PARTICLES);
        for _ in 0..60 {
            ball.step(0.01, &tuning);
        }
        assert!(ball.particles.is_empty());
    }

    #[test]
    fn test_park_takes_ball_out_of_play() {
        let tuning = Tuning::default();
        let mut ball = Ball::new(&tuning);
        ball.reset(Side::Ai, &tuning, &mut rng(3));
        assert!(ball.in_play);
        ball.park(&tuning);
        assert!(!ball.in_play);
        assert_eq!(ball.vel, Vec2::ZERO);
        assert_eq!(ball.pos, tuning.center());
    }

    #[test]
    fn test_player_paddle_decays_velocity() {
        let tuning = Tuning::default();
        let mut paddle = Paddle::new(Side::Player, &tuning);
        paddle.set_velocity(MoveDir::Down);
        paddle.step(0.01, &tuning);
        assert!((paddle.y - 206.0).abs() < 1e-3);
        assert!((paddle.vy - 540.0).abs() < 1e-3);

        paddle.set_velocity(MoveDir::Stop);
        let y = paddle.y;
        paddle.step(0.01, &tuning);
        assert_eq!(paddle.y, y);
    }

    #[test]
    fn test_ai_paddle_eases_toward_target() {
        let tuning = Tuning::default();
        let mut paddle = Paddle::new(Side::Ai, &tuning);
        paddle.smoothing = 0.25;
        paddle.target_y = 300.0;
        paddle.step(0.016, &tuning);
        assert_eq!(paddle.y, 225.0);
        paddle.step(0.016, &tuning);
        assert_eq!(paddle.y, 243.75);
    }

    #[test]
    fn test_winner_and_trailing_side() {
        let mut state = MatchState::new(350.0);
        assert_eq!(state.winner(5), None);
        assert_eq!(state.trailing_side(), Side::Ai);

        state.award_point(Side::Ai);
        assert_eq!(state.trailing_side(), Side::Player);

        for _ in 0..5 {
            state.award_point(Side::Player);
        }
        assert_eq!(state.trailing_side(), Side::Ai);
        assert_eq!(state.winner(5), Some(Side::Player));
    }

    #[test]
    fn test_screen_shake_decays_to_zero() {
        let mut state = MatchState::new(350.0);
        state.add_screen_shake(5.0);
        state.add_screen_shake(3.0);
        assert_eq!(state.screen_shake, 5.0);
        for _ in 0..100 {
            state.decay_screen_shake();
        }
        assert_eq!(state.screen_shake, 0.0);
    }

    proptest! {
        #[test]
        fn prop_reset_angle_and_direction(seed in any::<u64>(), to_ai in any::<bool>()) {
            let tuning = Tuning::default();
            let toward = if to_ai { Side::Ai } else { Side::Player };
            let mut ball = Ball::new(&tuning);
            ball.reset(toward, &tuning, &mut rng(seed));

            prop_assert_eq!(ball.vel.x.signum(), toward.toward());
            let angle = (ball.vel.y.abs() / ball.vel.x.abs()).atan();
            prop_assert!(angle >= FRAC_PI_8 - 1e-4 && angle <= FRAC_PI_4 + 1e-4);
            prop_assert!((ball.vel.length() - tuning.ball.initial_speed).abs() < 1e-2);
            prop_assert_eq!(ball.speed, tuning.ball.initial_speed);
        }

        #[test]
        fn prop_paddle_stays_in_bounds(
            moves in proptest::collection::vec((0u8..3, 0.0f32..0.05), 1..200),
            is_ai in any::<bool>(),
            targets in proptest::collection::vec(-1000.0f32..1400.0, 1..200),
        ) {
            let tuning = Tuning::default();
            let side = if is_ai { Side::Ai } else { Side::Player };
            let mut paddle = Paddle::new(side, &tuning);
            paddle.smoothing = 0.6;
            for (i, (dir, dt)) in moves.iter().enumerate() {
                let dir = match dir {
                    0 => MoveDir::Up,
                    1 => MoveDir::Down,
                    _ => MoveDir::Stop,
                };
                paddle.set_velocity(dir);
                paddle.target_y = targets[i % targets.len()];
                paddle.step(*dt, &tuning);
                prop_assert!(paddle.y >= tuning.paddle_min_y());
                prop_assert!(paddle.y <= tuning.paddle_max_y());
            }
        }
    }
}
