//! Synthetic patient drawn at the start of each round
//!
//! A patient is the ground truth for one round: the true systolic and
//! diastolic pressures gate when Korotkoff sounds are audible and are what
//! the player's readings are scored against.
//!
//! # Critical Invariants
//!
//! 1. `systolic > diastolic`, by a pulse pressure of 30–70 mmHg
//! 2. `diastolic` in 60–95 mmHg
//! 3. `heart_rate_bpm` in 55–100
//! 4. `sound_clarity` in 0.7–1.0
//!
//! Patients are immutable once created.

use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DIASTOLIC_MIN: i32 = 60;
pub const DIASTOLIC_MAX: i32 = 95;
pub const PULSE_PRESSURE_MIN: i32 = 30;
pub const PULSE_PRESSURE_MAX: i32 = 70;
pub const HEART_RATE_MIN: u32 = 55;
pub const HEART_RATE_MAX: u32 = 100;
pub const CLARITY_MIN: f64 = 0.7;
pub const CLARITY_MAX: f64 = 1.0;

/// Errors from building a patient with explicit values
#[derive(Debug, Error, PartialEq)]
pub enum PatientError {
    #[error("Systolic {systolic} must be above diastolic {diastolic}")]
    NotAboveDiastolic { systolic: i32, diastolic: i32 },

    #[error("Pulse pressure {margin} outside 30-70 mmHg")]
    MarginOutOfRange { margin: i32 },

    #[error("Diastolic {0} outside 60-95 mmHg")]
    DiastolicOutOfRange(i32),

    #[error("Heart rate {0} outside 55-100 bpm")]
    HeartRateOutOfRange(u32),

    #[error("Sound clarity {0} outside 0.7-1.0")]
    ClarityOutOfRange(f64),
}

/// Ground-truth vitals for one round
///
/// # Example
/// ```
/// use korotkoff_trainer_core::Patient;
///
/// let patient = Patient::new(120, 80, 60, 0.9).unwrap();
/// assert_eq!(patient.beat_interval_ms(), 1000.0);
/// assert_eq!(patient.inflation_target(30.0), 150.0);
/// assert_eq!(patient.deflation_floor(15.0), 65.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    systolic: i32,
    diastolic: i32,
    heart_rate_bpm: u32,
    sound_clarity: f64,
}

impl Patient {
    /// Build a patient from explicit values, checking every invariant
    pub fn new(
        systolic: i32,
        diastolic: i32,
        heart_rate_bpm: u32,
        sound_clarity: f64,
    ) -> Result<Self, PatientError> {
        if systolic <= diastolic {
            return Err(PatientError::NotAboveDiastolic {
                systolic,
                diastolic,
            });
        }
        if !(DIASTOLIC_MIN..=DIASTOLIC_MAX).contains(&diastolic) {
            return Err(PatientError::DiastolicOutOfRange(diastolic));
        }
        let margin = systolic - diastolic;
        if !(PULSE_PRESSURE_MIN..=PULSE_PRESSURE_MAX).contains(&margin) {
            return Err(PatientError::MarginOutOfRange { margin });
        }
        if !(HEART_RATE_MIN..=HEART_RATE_MAX).contains(&heart_rate_bpm) {
            return Err(PatientError::HeartRateOutOfRange(heart_rate_bpm));
        }
        if !(CLARITY_MIN..=CLARITY_MAX).contains(&sound_clarity) {
            return Err(PatientError::ClarityOutOfRange(sound_clarity));
        }

        Ok(Self {
            systolic,
            diastolic,
            heart_rate_bpm,
            sound_clarity,
        })
    }

    /// Draw a random patient
    ///
    /// Consumes exactly four values from `random`, in the order diastolic,
    /// pulse pressure, heart rate, clarity.
    pub fn generate(random: &mut dyn RandomSource) -> Self {
        let diastolic = random.uniform_int(DIASTOLIC_MIN, DIASTOLIC_MAX);
        let systolic = diastolic + random.uniform_int(PULSE_PRESSURE_MIN, PULSE_PRESSURE_MAX);
        let heart_rate_bpm =
            random.uniform_int(HEART_RATE_MIN as i32, HEART_RATE_MAX as i32) as u32;
        let sound_clarity = random.uniform_f64(CLARITY_MIN, CLARITY_MAX);

        debug_assert!(systolic > diastolic, "generated systolic must exceed diastolic");

        Self {
            systolic,
            diastolic,
            heart_rate_bpm,
            sound_clarity,
        }
    }

    pub fn systolic(&self) -> i32 {
        self.systolic
    }

    pub fn diastolic(&self) -> i32 {
        self.diastolic
    }

    pub fn heart_rate_bpm(&self) -> u32 {
        self.heart_rate_bpm
    }

    /// Intensity handed to the synthesizer for every beat
    pub fn sound_clarity(&self) -> f64 {
        self.sound_clarity
    }

    /// Length of one cardiac cycle in milliseconds
    pub fn beat_interval_ms(&self) -> f64 {
        60_000.0 / self.heart_rate_bpm as f64
    }

    /// Pressure at which inflation stops
    pub fn inflation_target(&self, margin_mmhg: f64) -> f64 {
        self.systolic as f64 + margin_mmhg
    }

    /// Pressure at or below which deflation ends the round
    pub fn deflation_floor(&self, margin_mmhg: f64) -> f64 {
        self.diastolic as f64 - margin_mmhg
    }

    /// Whether Korotkoff sounds are audible at `pressure`
    pub fn is_audible_at(&self, pressure: f64) -> bool {
        pressure >= self.diastolic as f64 && pressure <= self.systolic as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    #[test]
    fn test_rejects_inverted_pressures() {
        assert_eq!(
            Patient::new(80, 80, 60, 0.9),
            Err(PatientError::NotAboveDiastolic {
                systolic: 80,
                diastolic: 80
            })
        );
    }

    #[test]
    fn test_rejects_narrow_pulse_pressure() {
        assert_eq!(
            Patient::new(100, 80, 60, 0.9),
            Err(PatientError::MarginOutOfRange { margin: 20 })
        );
    }

    #[test]
    fn test_generate_lowest_draw() {
        let mut random = SequenceRandom::new(vec![0.0]);
        let patient = Patient::generate(&mut random);

        assert_eq!(patient.diastolic(), 60);
        assert_eq!(patient.systolic(), 90);
        assert_eq!(patient.heart_rate_bpm(), 55);
        assert_eq!(patient.sound_clarity(), 0.7);
    }

    #[test]
    fn test_audible_window_is_closed() {
        let patient = Patient::new(120, 80, 60, 0.9).unwrap();
        assert!(patient.is_audible_at(120.0));
        assert!(patient.is_audible_at(80.0));
        assert!(!patient.is_audible_at(120.125));
        assert!(!patient.is_audible_at(79.875));
    }
}
