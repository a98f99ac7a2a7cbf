//! Simulation Engine
//!
//! Main round loop integrating all components:
//! - Patient generation (seeded, injectable randomness)
//! - Cuff pressure ramp (inflate in steps, deflate at a constant rate)
//! - Korotkoff beat gating (heart-rate cadence inside the audible window)
//! - Player readings and round-end scoring
//! - Event logging (complete round history + observer notifications)
//!
//! # Architecture
//!
//! The engine is driven by one periodic timer per phase:
//!
//! ```text
//! start_round():
//!   cancel live timer → reset state → draw patient → arm timer → Inflating
//!
//! Each tick t (Inflating):
//!   1. pressure += step
//!   2. if pressure ≥ systolic + margin: clamp, cancel timer, arm new → Deflating
//!
//! Each tick t (Deflating):
//!   1. pressure -= rate × period
//!   2. if pressure ≤ diastolic − margin: cancel timer, score → Finished
//!   3. if t − last_beat ≥ 60000/bpm and diastolic ≤ pressure ≤ systolic:
//!      emit beat, last_beat = t
//! ```
//!
//! # Example
//!
//! ```rust
//! use korotkoff_trainer_core::audio::{NullSink, SoundSynthesizer};
//! use korotkoff_trainer_core::{
//!     EngineConfig, ManualClock, Patient, Phase, RngManager, SimulationEngine,
//! };
//!
//! let clock = ManualClock::new();
//! let mut engine = SimulationEngine::with_parts(
//!     EngineConfig::default(),
//!     Box::new(clock.clone()),
//!     Box::new(RngManager::new(12345)),
//!     SoundSynthesizer::new(Box::new(NullSink), 1),
//! )
//! .unwrap();
//!
//! engine.start_round_with(Patient::new(120, 80, 60, 0.9).unwrap());
//!
//! // 30 inflation ticks of 50 ms reach 150 mmHg
//! clock.advance(1_500.0);
//! engine.pump();
//! assert_eq!(engine.phase(), Phase::Deflating);
//! assert_eq!(engine.pressure(), 150.0);
//! ```

use crate::audio::{NullSink, SoundSynthesizer};
use crate::core::time::{Clock, SystemClock};
use crate::core::timer::{TickScheduler, TimerHandle};
use crate::models::event::{Event, EventLog, Reading};
use crate::models::patient::{Patient, DIASTOLIC_MIN};
use crate::models::state::{Phase, SimulationState};
use crate::rng::{RandomSource, RngManager};
use crate::scoring::{compute_feedback, Feedback};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

// ============================================================================
// Configuration Types
// ============================================================================

/// Pacing policy for a round
///
/// Defaults reproduce the classic trainer: 50 ms ticks, +5 mmHg per
/// inflation tick up to systolic + 30, deflation at 2.5 mmHg/s until
/// diastolic − 15.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Timer period for both ramps (ms)
    pub tick_period_ms: f64,

    /// Pressure added on each inflation tick (mmHg)
    pub inflation_step_mmhg: f64,

    /// Inflation stops at systolic + this margin (mmHg)
    pub inflation_margin_mmhg: f64,

    /// Deflation speed (mmHg per second)
    pub deflation_rate_mmhg_s: f64,

    /// Round ends at diastolic − this margin (mmHg)
    pub deflation_margin_mmhg: f64,

    /// Seed for patient draws; noise uses `rng_seed + 1`
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 50.0,
            inflation_step_mmhg: 5.0,
            inflation_margin_mmhg: 30.0,
            deflation_rate_mmhg_s: 2.5,
            deflation_margin_mmhg: 15.0,
            rng_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    ///
    /// # Example
    /// ```
    /// use korotkoff_trainer_core::EngineConfig;
    ///
    /// let config = EngineConfig::from_json(r#"{ "rng_seed": 7 }"#).unwrap();
    /// assert_eq!(config.rng_seed, 7);
    /// assert_eq!(config.tick_period_ms, 50.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimulationError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let positive = [
            ("tick_period_ms", self.tick_period_ms),
            ("inflation_step_mmhg", self.inflation_step_mmhg),
            ("deflation_rate_mmhg_s", self.deflation_rate_mmhg_s),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let margins = [
            ("inflation_margin_mmhg", self.inflation_margin_mmhg),
            ("deflation_margin_mmhg", self.deflation_margin_mmhg),
        ];
        for (name, value) in margins {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        // Pressure is clamped at 0, so a floor at or below 0 is never reached
        if self.deflation_margin_mmhg >= DIASTOLIC_MIN as f64 {
            return Err(SimulationError::InvalidConfig(format!(
                "deflation_margin_mmhg must be below {}, got {}",
                DIASTOLIC_MIN, self.deflation_margin_mmhg
            )));
        }

        Ok(())
    }

    /// Pressure removed on each deflation tick (mmHg)
    pub fn deflation_step_mmhg(&self) -> f64 {
        self.deflation_rate_mmhg_s * self.tick_period_ms / 1000.0
    }
}

/// Engine construction errors
///
/// Ticks themselves cannot fail; only configuration can.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Scheduled instant of the tick (ms)
    pub at_ms: f64,

    /// Phase after the tick
    pub phase: Phase,

    /// Cuff pressure after the tick (mmHg)
    pub pressure: f64,

    /// Whether a Korotkoff beat was emitted on this tick
    pub beat: bool,
}

// ============================================================================
// Engine
// ============================================================================

/// Observer callback invoked for every engine event
pub type Observer = Box<dyn FnMut(&Event)>;

/// Owns the round: patient, state, timer, synthesizer and event history
///
/// # Determinism
///
/// With a [`ManualClock`](crate::ManualClock) and a seeded or scripted
/// random source, the same calls produce the same ticks, beats and events.
pub struct SimulationEngine {
    config: EngineConfig,

    state: SimulationState,

    /// Ground truth for the current round (None before the first round)
    patient: Option<Patient>,

    /// Scoring of the last finished round
    feedback: Option<Feedback>,

    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
    synthesizer: SoundSynthesizer,

    scheduler: TickScheduler,

    /// The one live timer. Fires from any other handle are stale.
    timer: Option<TimerHandle>,

    /// 1-based round counter
    round: usize,

    event_log: EventLog,
    observers: Vec<Observer>,
}

impl SimulationEngine {
    /// Create an engine on the system clock with a seeded RNG and no sound
    pub fn new(config: EngineConfig) -> Result<Self, SimulationError> {
        let seed = config.rng_seed;
        Self::with_parts(
            config,
            Box::new(SystemClock::new()),
            Box::new(RngManager::new(seed)),
            SoundSynthesizer::new(Box::new(NullSink), seed.wrapping_add(1)),
        )
    }

    /// Create an engine from explicit collaborators
    pub fn with_parts(
        config: EngineConfig,
        clock: Box<dyn Clock>,
        random: Box<dyn RandomSource>,
        synthesizer: SoundSynthesizer,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        Ok(Self {
            config,
            state: SimulationState::new(),
            patient: None,
            feedback: None,
            clock,
            random,
            synthesizer,
            scheduler: TickScheduler::new(),
            timer: None,
            round: 0,
            event_log: EventLog::new(),
            observers: Vec::new(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn pressure(&self) -> f64 {
        self.state.pressure()
    }

    pub fn player_systolic(&self) -> Option<i32> {
        self.state.player_systolic()
    }

    pub fn player_diastolic(&self) -> Option<i32> {
        self.state.player_diastolic()
    }

    pub fn patient(&self) -> Option<&Patient> {
        self.patient.as_ref()
    }

    /// Scoring of the round, available once it is `Finished`
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Whether a tick timer is currently armed
    pub fn has_live_timer(&self) -> bool {
        self.timer.is_some_and(|h| self.scheduler.is_active(h))
    }

    /// Number of timers armed in the scheduler (never more than one)
    pub fn armed_timer_count(&self) -> usize {
        self.scheduler.active_count()
    }

    // ========================================================================
    // Event Logging
    // ========================================================================

    /// Register a callback invoked synchronously for every event
    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn log_event(&mut self, event: Event) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
        self.event_log.log(event);
    }

    // ========================================================================
    // Player Actions
    // ========================================================================

    /// Begin a new round with a freshly drawn patient
    pub fn start_round(&mut self) {
        let patient = Patient::generate(&mut *self.random);
        self.start_round_with(patient);
    }

    /// Begin a new round with a given patient
    ///
    /// Accepted in any phase. The live timer is cancelled before any state
    /// is reset, so no tick from the previous round can touch the new one.
    /// The event log is cleared; observers still see every event.
    pub fn start_round_with(&mut self, patient: Patient) {
        let now = self.clock.now_ms();
        self.disarm();
        self.event_log.clear();

        let previous = self.state.phase();
        self.round += 1;
        self.state.reset_for_round();
        self.feedback = None;
        self.patient = Some(patient.clone());

        info!(
            round = self.round,
            systolic = patient.systolic(),
            diastolic = patient.diastolic(),
            heart_rate = patient.heart_rate_bpm(),
            "round started"
        );

        self.log_event(Event::RoundStarted {
            round: self.round,
            at_ms: now,
            patient,
        });
        self.log_event(Event::PhaseChanged {
            round: self.round,
            at_ms: now,
            from: previous,
            to: Phase::Inflating,
        });
        self.arm(now);
    }

    /// Record the current pressure as the systolic reading
    ///
    /// Ticks already due on the clock run first, so the reading and the
    /// phase guard see the present rather than the last pump. Returns the
    /// recorded value, or `None` if not deflating or already marked this
    /// round.
    pub fn mark_systolic(&mut self) -> Option<i32> {
        self.pump();
        let value = self.state.mark_systolic()?;
        self.log_reading(Reading::Systolic, value);
        Some(value)
    }

    /// Record the current pressure as the diastolic reading
    pub fn mark_diastolic(&mut self) -> Option<i32> {
        self.pump();
        let value = self.state.mark_diastolic()?;
        self.log_reading(Reading::Diastolic, value);
        Some(value)
    }

    fn log_reading(&mut self, reading: Reading, value: i32) {
        debug!(round = self.round, ?reading, value, "reading marked");
        self.log_event(Event::ReadingMarked {
            round: self.round,
            at_ms: self.clock.now_ms(),
            reading,
            value,
        });
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Run every tick that has come due by the current clock reading
    ///
    /// Ticks are evaluated at their scheduled instants, so calling this late
    /// catches up without changing beat timing.
    pub fn pump(&mut self) -> Vec<TickResult> {
        let now = self.clock.now_ms();
        let mut results = Vec::new();

        while let Some(fire) = self.scheduler.next_due(now) {
            if self.timer != Some(fire.handle) {
                trace!(timer = fire.handle.id(), "stale tick dropped");
                self.scheduler.cancel(fire.handle);
                continue;
            }
            results.push(self.tick(fire.at_ms));
        }

        results
    }

    fn tick(&mut self, at_ms: f64) -> TickResult {
        let mut beat = false;

        match (self.state.phase(), self.patient.clone()) {
            (Phase::Inflating, Some(patient)) => self.inflate(at_ms, &patient),
            (Phase::Deflating, Some(patient)) => beat = self.deflate(at_ms, &patient),
            (phase, _) => {
                trace!(%phase, "tick outside a running phase");
                self.disarm();
            }
        }

        TickResult {
            at_ms,
            phase: self.state.phase(),
            pressure: self.state.pressure(),
            beat,
        }
    }

    fn inflate(&mut self, at_ms: f64, patient: &Patient) {
        let target = patient.inflation_target(self.config.inflation_margin_mmhg);
        let next = self.state.pressure() + self.config.inflation_step_mmhg;

        if next >= target {
            self.set_pressure(at_ms, target);
            self.state.record_beat(at_ms);
            self.transition(at_ms, Phase::Deflating);
        } else {
            self.set_pressure(at_ms, next);
        }
    }

    /// Returns true if a beat was emitted
    fn deflate(&mut self, at_ms: f64, patient: &Patient) -> bool {
        let next = self.state.pressure() - self.config.deflation_step_mmhg();
        self.set_pressure(at_ms, next);

        let pressure = self.state.pressure();
        if pressure <= patient.deflation_floor(self.config.deflation_margin_mmhg) {
            self.finish(at_ms, patient);
            return false;
        }

        let beat_due = at_ms - self.state.last_beat_ms() >= patient.beat_interval_ms();
        if !(beat_due && patient.is_audible_at(pressure)) {
            return false;
        }

        let intensity = patient.sound_clarity();
        self.synthesizer.emit(intensity);
        self.state.record_beat(at_ms);

        debug!(round = self.round, at_ms, pressure, "beat");
        self.log_event(Event::Beat {
            round: self.round,
            at_ms,
            pressure,
            intensity,
        });
        true
    }

    fn finish(&mut self, at_ms: f64, patient: &Patient) {
        self.transition(at_ms, Phase::Finished);

        let feedback = compute_feedback(
            patient,
            self.state.player_systolic(),
            self.state.player_diastolic(),
        );
        info!(
            round = self.round,
            outcome = %feedback.outcome,
            player_systolic = ?self.state.player_systolic(),
            player_diastolic = ?self.state.player_diastolic(),
            "round finished"
        );

        self.feedback = Some(feedback.clone());
        self.log_event(Event::RoundFinished {
            round: self.round,
            at_ms,
            feedback,
        });
    }

    fn set_pressure(&mut self, at_ms: f64, pressure: f64) {
        self.state.set_pressure(pressure);
        self.log_event(Event::PressureChanged {
            round: self.round,
            at_ms,
            pressure: self.state.pressure(),
        });
    }

    /// Move to `to`, replacing the live timer
    fn transition(&mut self, at_ms: f64, to: Phase) {
        self.disarm();

        let from = self.state.phase();
        self.state.set_phase(to);
        info!(round = self.round, %from, %to, "phase changed");
        self.log_event(Event::PhaseChanged {
            round: self.round,
            at_ms,
            from,
            to,
        });

        if to.is_running() {
            self.arm(at_ms);
        }
    }

    fn arm(&mut self, now_ms: f64) {
        debug_assert!(self.timer.is_none(), "live timer must be cancelled before arming");
        self.timer = Some(self.scheduler.every(self.config.tick_period_ms, now_ms));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::ManualClock;

    fn engine_with(clock: &ManualClock) -> SimulationEngine {
        SimulationEngine::with_parts(
            EngineConfig::default(),
            Box::new(clock.clone()),
            Box::new(RngManager::new(42)),
            SoundSynthesizer::new(Box::new(NullSink), 43),
        )
        .unwrap()
    }

    #[test]
    fn test_default_deflation_step() {
        assert_eq!(EngineConfig::default().deflation_step_mmhg(), 0.125);
    }

    #[test]
    fn test_rejects_zero_period() {
        let config = EngineConfig {
            tick_period_ms: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_nan_rate() {
        let config = EngineConfig {
            deflation_rate_mmhg_s: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unreachable_floor() {
        let config = EngineConfig {
            deflation_margin_mmhg: 60.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pump_before_start_does_nothing() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        clock.advance(10_000.0);

        assert!(engine.pump().is_empty());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_first_tick_one_period_after_start() {
        let clock = ManualClock::starting_at(1_000.0);
        let mut engine = engine_with(&clock);
        engine.start_round();

        clock.advance(49.0);
        assert!(engine.pump().is_empty());

        clock.advance(1.0);
        let ticks = engine.pump();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].at_ms, 1_050.0);
        assert_eq!(ticks[0].pressure, 5.0);
    }

    #[test]
    fn test_observer_sees_every_logged_event() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let seen = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&seen);
        engine.subscribe(move |_| *counter.borrow_mut() += 1);

        engine.start_round();
        clock.advance(500.0);
        engine.pump();

        assert_eq!(*seen.borrow(), engine.event_log().len());
    }
}
