//! xorshift64* random number generator
//!
//! xorshift64* passes TestU01's BigCrush, needs only 64 bits of state and
//! is cheap enough to fill a 100 ms noise buffer on every heartbeat.
//!
//! Same seed → same patients and same noise bursts, which keeps rounds
//! reproducible for debugging and tests.

use super::RandomSource;
use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use korotkoff_trainer_core::{RandomSource, RngManager};
///
/// let mut rng = RngManager::new(12345);
/// let diastolic = rng.uniform_int(60, 95);
/// assert!((60..=95).contains(&diastolic));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 because xorshift never leaves the
    /// all-zero state.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform sample in `[-1.0, 1.0)`, used for white noise
    pub fn next_signed(&mut self) -> f32 {
        (self.next_f64() * 2.0 - 1.0) as f32
    }

    /// Current internal state
    ///
    /// Feeding this back into [`RngManager::new`] resumes the same sequence.
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for RngManager {
    fn next_f64(&mut self) -> f64 {
        // Top 53 bits → [0.0, 1.0)
        (self.next() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                (0.0..1.0).contains(&val),
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_next_signed_in_range() {
        let mut rng = RngManager::new(7);

        for _ in 0..1000 {
            let val = rng.next_signed();
            assert!((-1.0..1.0).contains(&val), "noise sample {} out of range", val);
        }
    }

    #[test]
    fn test_resume_from_state() {
        let mut rng = RngManager::new(99999);
        rng.next();
        let mut resumed = RngManager::new(rng.state());

        assert_eq!(rng.next(), resumed.next());
    }
}
