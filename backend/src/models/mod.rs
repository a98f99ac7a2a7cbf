//! Domain models for the blood-pressure trainer

pub mod event;
pub mod patient;
pub mod state;

// Re-exports
pub use event::{Event, EventLog, Reading};
pub use patient::{Patient, PatientError};
pub use state::{Phase, SimulationState};
