//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - One `update` per rendered frame, step length clamped
//! - Seeded RNG only
//! - Collaborators (AI, audio, clock) passed in, no globals
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod signal;
pub mod state;
pub mod tick;

pub use clock::{Clock, FrameClock};
pub use collision::{Aabb, MAX_BOUNCE_ANGLE, paddle_contact, rescale, resolve_paddle_hit};
pub use signal::{NullSink, Signal, SignalSink};
pub use state::{
    Ball, GameEvent, GamePhase, MatchState, MatchSummary, MoveDir, Paddle, Particle, ServeTimer,
    Side, TRAIL_LENGTH, TrailPoint,
};
pub use tick::{Match, TickInput};
