//! Time sources for the simulation
//!
//! The engine never reads the wall clock directly. It asks a [`Clock`] for a
//! monotonic reading in milliseconds, which lets tests drive time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic time source in milliseconds
pub trait Clock {
    /// Current reading in milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> f64;
}

/// Wall-clock backed [`Clock`] measuring from its own creation
///
/// # Example
/// ```
/// use korotkoff_trainer_core::{Clock, SystemClock};
///
/// let clock = SystemClock::new();
/// assert!(clock.now_ms() >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven [`Clock`] for deterministic runs
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the engine.
///
/// # Example
/// ```
/// use korotkoff_trainer_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let engine_view = clock.clone();
///
/// clock.advance(50.0);
/// assert_eq!(engine_view.now_ms(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// f64 bit pattern of the current reading
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading 0 ms
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a clock at an arbitrary reading
    pub fn starting_at(ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(ms.to_bits())),
        }
    }

    /// Move time forward by `ms`
    ///
    /// # Panics
    /// Panics if `ms` is negative; the clock is monotonic.
    pub fn advance(&self, ms: f64) {
        assert!(ms >= 0.0, "clock cannot move backwards");
        self.set(self.now_ms() + ms);
    }

    /// Jump to an absolute reading
    ///
    /// # Panics
    /// Panics if `ms` is earlier than the current reading.
    pub fn set(&self, ms: f64) {
        assert!(ms >= self.now_ms(), "clock cannot move backwards");
        self.bits.store(ms.to_bits(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
