//! Two-segment amplitude envelope of a Korotkoff thump
//!
//! ```text
//! gain
//!  peak ┤  ╱╲
//!       │ ╱  ╲_
//!       │╱     ‾‾‾‾──────____ floor
//!     0 ┼──┬──────────────────┬── t (ms)
//!          10                100
//! ```
//!
//! Linear attack from 0 to `peak` over the first 10 ms, then an exponential
//! decay from `peak` to `floor` (0.0001) over the remaining 90 ms. After the
//! end the voice is stopped, so the gain is 0.

use serde::{Deserialize, Serialize};

pub const ATTACK_MS: f64 = 10.0;
pub const DECAY_MS: f64 = 90.0;
pub const DECAY_FLOOR: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    peak: f64,
    attack_ms: f64,
    decay_ms: f64,
    floor: f64,
}

impl Envelope {
    /// Standard thump envelope reaching `peak` at 10 ms
    ///
    /// # Example
    /// ```
    /// use korotkoff_trainer_core::audio::Envelope;
    ///
    /// let env = Envelope::korotkoff(0.8);
    /// assert_eq!(env.gain_at(0.0), 0.0);
    /// assert!((env.gain_at(5.0) - 0.4).abs() < 1e-12);
    /// assert!((env.gain_at(10.0) - 0.8).abs() < 1e-12);
    /// assert!((env.gain_at(100.0) - 0.0001).abs() < 1e-12);
    /// assert_eq!(env.gain_at(100.5), 0.0);
    /// ```
    pub fn korotkoff(peak: f64) -> Self {
        Self {
            peak,
            attack_ms: ATTACK_MS,
            decay_ms: DECAY_MS,
            floor: DECAY_FLOOR,
        }
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn duration_ms(&self) -> f64 {
        self.attack_ms + self.decay_ms
    }

    /// Gain `t_ms` after the voice started
    pub fn gain_at(&self, t_ms: f64) -> f64 {
        if self.peak <= 0.0 || t_ms < 0.0 || t_ms > self.duration_ms() {
            return 0.0;
        }
        if t_ms <= self.attack_ms {
            return self.peak * t_ms / self.attack_ms;
        }
        let progress = (t_ms - self.attack_ms) / self.decay_ms;
        self.peak * (self.floor / self.peak).powf(progress)
    }
}
