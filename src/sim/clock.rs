//! Time sources for the match controller

/// Monotonic time in seconds
pub trait Clock {
    fn now(&self) -> f64;

    /// Called once per simulated step with the (clamped) step length
    ///
    /// Wall clocks can ignore this.
    fn advance(&mut self, _dt: f32) {}
}

/// Clock driven purely by simulated steps (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    now: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for FrameClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn advance(&mut self, dt: f32) {
        self.now += dt as f64;
    }
}
