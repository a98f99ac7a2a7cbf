//! Cancelable periodic timers
//!
//! The scheduler does not call back into anyone. Drivers poll
//! [`TickScheduler::next_due`] with the current clock reading and dispatch
//! each [`TimerFire`] themselves, so whoever owns the timer handle decides
//! whether a fire is still relevant.
//!
//! Firing instants are computed as `start + k * period`, never accumulated,
//! so long runs do not drift.

/// Identifies one armed periodic timer
///
/// Handles are never reused: arming a new timer always yields a fresh id,
/// so a handle kept from a previous phase can be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerHandle {
    id: u64,
    period_ms: f64,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }
}

/// One due firing of a timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerFire {
    /// Timer that fired
    pub handle: TimerHandle,

    /// Scheduled instant of this firing (ms)
    pub at_ms: f64,
}

#[derive(Debug, Clone)]
struct ArmedTimer {
    handle: TimerHandle,
    started_ms: f64,
    fired: u64,
}

impl ArmedTimer {
    fn next_due_ms(&self) -> f64 {
        self.started_ms + (self.fired + 1) as f64 * self.handle.period_ms
    }
}

/// Table of armed periodic timers
///
/// # Example
/// ```
/// use korotkoff_trainer_core::TickScheduler;
///
/// let mut scheduler = TickScheduler::new();
/// let handle = scheduler.every(50.0, 0.0);
///
/// assert!(scheduler.next_due(49.0).is_none());
/// let fire = scheduler.next_due(100.0).unwrap();
/// assert_eq!(fire.handle, handle);
/// assert_eq!(fire.at_ms, 50.0);
///
/// scheduler.cancel(handle);
/// assert!(scheduler.next_due(1_000.0).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    next_id: u64,
    timers: Vec<ArmedTimer>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer firing every `period_ms`, first at `now_ms + period_ms`
    ///
    /// # Panics
    /// Panics if `period_ms` is not strictly positive.
    pub fn every(&mut self, period_ms: f64, now_ms: f64) -> TimerHandle {
        assert!(period_ms > 0.0, "timer period must be positive");

        self.next_id += 1;
        let handle = TimerHandle {
            id: self.next_id,
            period_ms,
        };
        self.timers.push(ArmedTimer {
            handle,
            started_ms: now_ms,
            fired: 0,
        });
        handle
    }

    /// Disarm a timer. Returns false if it was not armed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle.id != handle.id);
        self.timers.len() != before
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle.id == handle.id)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest firing due at or before `now_ms`
    ///
    /// A timer that fell behind yields its missed periods one call at a
    /// time, in order.
    pub fn next_due(&mut self, now_ms: f64) -> Option<TimerFire> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due_ms() <= now_ms)
            .min_by(|a, b| a.next_due_ms().total_cmp(&b.next_due_ms()))?;

        let at_ms = timer.next_due_ms();
        timer.fired += 1;
        Some(TimerFire {
            handle: timer.handle,
            at_ms,
        })
    }
}
