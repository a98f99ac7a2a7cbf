//! Orchestrator - the round state machine
//!
//! See `engine.rs` for full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{EngineConfig, Observer, SimulationEngine, SimulationError, TickResult};
