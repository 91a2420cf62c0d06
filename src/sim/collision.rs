//! Collision detection and response
//!
//! Axis-aligned boxes for the ball and both paddles. Contact is tested on
//! boxes grown by a small tolerance so a fast ball can't slip between two
//! frames, and a hit only counts while the ball is still approaching.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;

use super::state::{Ball, Paddle, Side};
use crate::tuning::Tuning;

/// Maximum deflection off a paddle edge (45°)
pub const MAX_BOUNCE_ANGLE: f32 = FRAC_PI_4;

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            left: center.x - half_extents.x,
            right: center.x + half_extents.x,
            top: center.y - half_extents.y,
            bottom: center.y + half_extents.y,
        }
    }

    /// Grow the box by `amount` on every side
    pub fn expand(&self, amount: f32) -> Self {
        Self {
            left: self.left - amount,
            right: self.right + amount,
            top: self.top - amount,
            bottom: self.bottom + amount,
        }
    }

    /// Inclusive overlap test (touching edges count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right >= other.left
            && self.left <= other.right
            && self.bottom >= other.top
            && self.top <= other.bottom
    }
}

/// Scale a velocity to the given magnitude, keeping its direction
///
/// A zero vector stays zero.
#[inline]
pub fn rescale(vel: Vec2, speed: f32) -> Vec2 {
    vel.normalize_or_zero() * speed
}

/// Whether the ball is touching `paddle` while moving toward it
pub fn paddle_contact(ball: &Ball, paddle: &Paddle, tolerance: f32) -> bool {
    let approaching = match paddle.side {
        Side::Player => ball.vel.x < 0.0,
        Side::Ai => ball.vel.x > 0.0,
    };
    approaching && ball.bounds().overlaps(&paddle.bounds().expand(tolerance))
}

/// Send the ball back off `paddle`
///
/// The outgoing angle depends on where the ball met the paddle: dead centre
/// returns it flat, the edges deflect up to [`MAX_BOUNCE_ANGLE`]. The ball is
/// moved clear of the paddle then accelerated.
pub fn resolve_paddle_hit(ball: &mut Ball, paddle: &Paddle, tuning: &Tuning) {
    let relative = ((ball.pos.y - paddle.y) / (paddle.height / 2.0)).clamp(-1.0, 1.0);
    let angle = relative * MAX_BOUNCE_ANGLE;
    let dir = paddle.side.away();

    ball.vel = Vec2::new(angle.cos() * ball.speed * dir, angle.sin() * ball.speed);

    let separation = paddle.width / 2.0 + ball.radius + tuning.game.paddle_separation;
    ball.pos.x = paddle.x + separation * dir;

    ball.accelerate(&tuning.ball);
}
