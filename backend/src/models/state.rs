//! Simulation State
//!
//! The mutable half of a round: phase, cuff pressure, beat bookkeeping and
//! the player's two readings. Only the engine mutates it.
//!
//! # Critical Invariants
//!
//! 1. **Non-negative pressure**: `pressure >= 0.0` at all times
//! 2. **Write-once readings**: each reading is set at most once per round,
//!    and only while deflating
//! 3. **Frozen after finish**: once `Finished`, pressure and readings do not
//!    change until the next round starts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the measurement round
///
/// ```text
/// Idle ──start──▶ Inflating ──target reached──▶ Deflating ──floor reached──▶ Finished
///                     ▲                                                         │
///                     └──────────────────────────start──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Inflating,
    Deflating,
    Finished,
}

impl Phase {
    /// Whether the cuff pressure is being driven by a timer in this phase
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Inflating | Phase::Deflating)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Inflating => "inflating",
            Phase::Deflating => "deflating",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Complete mutable state of one round
///
/// # Example
///
/// ```rust
/// use korotkoff_trainer_core::{Phase, SimulationState};
///
/// let state = SimulationState::new();
/// assert_eq!(state.phase(), Phase::Idle);
/// assert_eq!(state.pressure(), 0.0);
/// assert!(state.player_systolic().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    phase: Phase,

    /// Cuff pressure in mmHg
    pressure: f64,

    /// Clock reading of the last emitted beat (or of deflation start)
    last_beat_ms: f64,

    player_systolic: Option<i32>,
    player_diastolic: Option<i32>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pressure: 0.0,
            last_beat_ms: 0.0,
            player_systolic: None,
            player_diastolic: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn last_beat_ms(&self) -> f64 {
        self.last_beat_ms
    }

    pub fn player_systolic(&self) -> Option<i32> {
        self.player_systolic
    }

    pub fn player_diastolic(&self) -> Option<i32> {
        self.player_diastolic
    }

    // ========================================================================
    // Mutation (engine only)
    // ========================================================================

    /// Wipe everything for a fresh round and enter `Inflating`
    pub(crate) fn reset_for_round(&mut self) {
        *self = Self::new();
        self.phase = Phase::Inflating;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Set cuff pressure, clamped at zero
    pub(crate) fn set_pressure(&mut self, pressure: f64) {
        debug_assert!(
            self.phase != Phase::Finished,
            "pressure is frozen once the round is finished"
        );
        self.pressure = pressure.max(0.0);
    }

    pub(crate) fn record_beat(&mut self, at_ms: f64) {
        self.last_beat_ms = at_ms;
    }

    /// Record the systolic reading if none is set yet
    ///
    /// Returns the rounded reading when this call recorded it.
    pub(crate) fn mark_systolic(&mut self) -> Option<i32> {
        Self::mark(&mut self.player_systolic, self.phase, self.pressure)
    }

    /// Record the diastolic reading if none is set yet
    pub(crate) fn mark_diastolic(&mut self) -> Option<i32> {
        Self::mark(&mut self.player_diastolic, self.phase, self.pressure)
    }

    fn mark(slot: &mut Option<i32>, phase: Phase, pressure: f64) -> Option<i32> {
        if phase != Phase::Deflating || slot.is_some() {
            return None;
        }
        let reading = pressure.round() as i32;
        *slot = Some(reading);
        Some(reading)
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}
