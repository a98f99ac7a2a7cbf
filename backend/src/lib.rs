//! Korotkoff Trainer Core - Rust Engine
//!
//! Headless engine for an auscultatory blood-pressure training exercise:
//! a synthetic patient, a simulated cuff ramp, heartbeat sounds gated to the
//! window between true diastolic and systolic pressure, and scoring of the
//! player's readings.
//!
//! # Architecture
//!
//! - **core**: Clocks and cancelable periodic timers
//! - **models**: Domain types (Patient, SimulationState, Event)
//! - **orchestrator**: Round state machine and tick loop
//! - **audio**: Procedural Korotkoff sound synthesis and output sinks
//! - **scoring**: Round-end grading
//! - **gauge**: Dial geometry for presentation layers
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Time and randomness are injected (Clock, RandomSource)
//! 2. Exactly one tick timer is live; every phase change replaces it
//! 3. Sound is fire-and-forget and never fails the round

// Module declarations
pub mod audio;
pub mod core;
pub mod gauge;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod scoring;

// Re-exports for convenience
pub use crate::core::time::{Clock, ManualClock, SystemClock};
pub use crate::core::timer::{TickScheduler, TimerFire, TimerHandle};
pub use audio::{AudioError, AudioSink, SoundSynthesizer};
pub use models::{
    event::{Event, EventLog, Reading},
    patient::{Patient, PatientError},
    state::{Phase, SimulationState},
};
pub use orchestrator::{EngineConfig, SimulationEngine, SimulationError, TickResult};
pub use rng::{RandomSource, RngManager, SequenceRandom};
pub use scoring::{compute_feedback, Feedback, Outcome};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn korotkoff_trainer_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::engine::PySimulationEngine>()?;
    Ok(())
}
