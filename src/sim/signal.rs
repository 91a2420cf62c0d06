//! Fire-and-forget impact signals for audio and other collaborators

use serde::{Deserialize, Serialize};

/// A discrete impact the simulation wants heard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Ball bounced off the top or bottom wall
    Wall,
    /// Ball came off a paddle
    Paddle,
    /// A point was scored
    Score,
}

/// Receiver for [`Signal`]s
///
/// Sinks have no way to report failure back to the simulation; a sink that
/// can't play a sound just drops it.
pub trait SignalSink {
    fn signal(&mut self, signal: Signal);
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn signal(&mut self, _signal: Signal) {}
}

/// Records every signal, oldest first
impl SignalSink for Vec<Signal> {
    fn signal(&mut self, signal: Signal) {
        self.push(signal);
    }
}

impl<T: SignalSink + ?Sized> SignalSink for Box<T> {
    fn signal(&mut self, signal: Signal) {
        (**self).signal(signal)
    }
}
