//! Animation frame timing

use crate::consts::MAX_DT;

/// Turns `requestAnimationFrame` timestamps into simulation steps
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTimer {
    last_ms: Option<f64>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame, clamped to `[0, MAX_DT]`.
    /// The first frame after construction or [`reset`](Self::reset) is 0.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (((timestamp_ms - last) / 1000.0) as f32).clamp(0.0, MAX_DT),
            None => 0.0,
        };
        self.last_ms = Some(timestamp_ms);
        dt
    }

    /// Forget the previous timestamp (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
