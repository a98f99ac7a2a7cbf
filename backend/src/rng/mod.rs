//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! All randomness in the trainer (patient draws and noise bursts) goes through
//! the [`RandomSource`] trait so tests can substitute scripted values.

mod sequence;
mod xorshift;

pub use sequence::SequenceRandom;
pub use xorshift::RngManager;

/// Uniform random source over `[0.0, 1.0)`
pub trait RandomSource {
    /// Next uniform value in `[0.0, 1.0)`
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in the inclusive range `[min, max]`
    ///
    /// # Panics
    /// Panics if `min > max`.
    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "min must not exceed max");
        let span = (max - min + 1) as f64;
        min + (self.next_f64() * span).floor() as i32
    }

    /// Uniform float in `[min, max)`
    fn uniform_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}
