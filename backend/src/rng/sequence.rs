//! Scripted random source for tests and demos

use super::RandomSource;

/// Replays a fixed list of uniform values, cycling when exhausted
///
/// # Example
/// ```
/// use korotkoff_trainer_core::{RandomSource, SequenceRandom};
///
/// let mut random = SequenceRandom::new(vec![0.0, 0.5]);
/// assert_eq!(random.next_f64(), 0.0);
/// assert_eq!(random.next_f64(), 0.5);
/// assert_eq!(random.next_f64(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    /// # Panics
    /// Panics if `values` is empty or any value lies outside `[0.0, 1.0)`.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence must not be empty");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "sequence values must lie in [0.0, 1.0)"
        );
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}
