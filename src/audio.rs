//! Audio for impact signals
//!
//! Procedurally generated tones - no external files needed! The tone table
//! is platform independent; playback uses the Web Audio API and only exists
//! on wasm.

use crate::sim::Signal;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// A short chord played for one signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// One oscillator per frequency (Hz)
    pub frequencies: &'static [f32],
    /// Seconds until the envelope has decayed
    pub duration: f32,
    pub waveform: Waveform,
}

/// Attack time of every tone (seconds)
pub const ATTACK: f32 = 0.01;

/// The tone played for each signal
pub fn tone_for(signal: Signal) -> Tone {
    match signal {
        Signal::Paddle => Tone {
            frequencies: &[800.0, 1200.0],
            duration: 0.1,
            waveform: Waveform::Sawtooth,
        },
        Signal::Wall => Tone {
            frequencies: &[400.0, 600.0],
            duration: 0.15,
            waveform: Waveform::Triangle,
        },
        Signal::Score => Tone {
            frequencies: &[600.0, 800.0, 1000.0],
            duration: 0.4,
            waveform: Waveform::Sine,
        },
    }
}

/// Peak gain of each oscillator in a tone, so a chord is no louder than a
/// single note
pub fn oscillator_peak(volume: f32, tone: &Tone) -> f32 {
    if tone.frequencies.is_empty() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0) * 0.1 / tone.frequencies.len() as f32
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorType};

    use super::{ATTACK, Tone, Waveform, oscillator_peak, tone_for};
    use crate::sim::{Signal, SignalSink};

    impl From<Waveform> for OscillatorType {
        fn from(wave: Waveform) -> Self {
            match wave {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            }
        }
    }

    /// Web Audio signal sink
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.7,
            }
        }

        /// Set volume (0.0 - 1.0)
        pub fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn play(&self, tone: &Tone) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some(master) = ctx.create_gain().ok() else {
                return;
            };
            if master.connect_with_audio_node(&ctx.destination()).is_err() {
                return;
            }

            let peak = oscillator_peak(self.volume, tone);
            for &freq in tone.frequencies {
                let _ = self.play_voice(ctx, &master, freq, tone, peak);
            }
        }

        fn play_voice(
            &self,
            ctx: &AudioContext,
            master: &GainNode,
            freq: f32,
            tone: &Tone,
            peak: f32,
        ) -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(master).ok()?;

            let t = ctx.current_time();
            let end = t + tone.duration as f64;

            osc.set_type(tone.waveform.into());
            osc.frequency().set_value_at_time(freq, t).ok()?;

            gain.gain().set_value_at_time(0.0, t).ok()?;
            gain.gain()
                .linear_ramp_to_value_at_time(peak, t + ATTACK as f64)
                .ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, end)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(end).ok()?;
            Some(())
        }
    }

    impl SignalSink for AudioManager {
        fn signal(&mut self, signal: Signal) {
            self.play(&tone_for(signal));
        }
    }
}
