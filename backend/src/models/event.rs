//! Event logging for round replay and presentation updates.
//!
//! Every observable change the engine makes is captured as an [`Event`].
//! Events serve two purposes:
//! - **Notification**: observers registered on the engine receive each
//!   event as it happens, so a display can redraw only on change
//! - **History**: the [`EventLog`] keeps the complete sequence for
//!   debugging, tests and export
//!
//! # Event Types
//!
//! - **RoundStarted**: new patient drawn, cuff reset
//! - **PhaseChanged**: state machine transition
//! - **PressureChanged**: cuff pressure moved on a tick
//! - **Beat**: a Korotkoff sound was requested from the synthesizer
//! - **ReadingMarked**: the player recorded a systolic or diastolic value
//! - **RoundFinished**: deflation ended and the round was scored
//!
//! # Example
//!
//! ```rust
//! use korotkoff_trainer_core::models::Event;
//!
//! let event = Event::Beat {
//!     round: 1,
//!     at_ms: 13_500.0,
//!     pressure: 120.0,
//!     intensity: 0.85,
//! };
//!
//! assert_eq!(event.event_type(), "Beat");
//! assert_eq!(event.at_ms(), 13_500.0);
//! ```

use crate::models::patient::Patient;
use crate::models::state::Phase;
use crate::scoring::Feedback;
use serde::Serialize;

/// Which of the two readings a mark refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reading {
    Systolic,
    Diastolic,
}

/// Engine event capturing a state change.
///
/// All events carry the round number and the engine-clock instant (ms).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    RoundStarted {
        round: usize,
        at_ms: f64,
        patient: Patient,
    },

    PhaseChanged {
        round: usize,
        at_ms: f64,
        from: Phase,
        to: Phase,
    },

    PressureChanged {
        round: usize,
        at_ms: f64,
        pressure: f64,
    },

    Beat {
        round: usize,
        at_ms: f64,
        pressure: f64,
        intensity: f64,
    },

    ReadingMarked {
        round: usize,
        at_ms: f64,
        reading: Reading,
        value: i32,
    },

    RoundFinished {
        round: usize,
        at_ms: f64,
        feedback: Feedback,
    },
}

impl Event {
    pub fn round(&self) -> usize {
        match self {
            Event::RoundStarted { round, .. }
            | Event::PhaseChanged { round, .. }
            | Event::PressureChanged { round, .. }
            | Event::Beat { round, .. }
            | Event::ReadingMarked { round, .. }
            | Event::RoundFinished { round, .. } => *round,
        }
    }

    pub fn at_ms(&self) -> f64 {
        match self {
            Event::RoundStarted { at_ms, .. }
            | Event::PhaseChanged { at_ms, .. }
            | Event::PressureChanged { at_ms, .. }
            | Event::Beat { at_ms, .. }
            | Event::ReadingMarked { at_ms, .. }
            | Event::RoundFinished { at_ms, .. } => *at_ms,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::RoundStarted { .. } => "RoundStarted",
            Event::PhaseChanged { .. } => "PhaseChanged",
            Event::PressureChanged { .. } => "PressureChanged",
            Event::Beat { .. } => "Beat",
            Event::ReadingMarked { .. } => "ReadingMarked",
            Event::RoundFinished { .. } => "RoundFinished",
        }
    }
}

/// Event log for storing and querying engine events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_round(&self, round: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.round() == round).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
