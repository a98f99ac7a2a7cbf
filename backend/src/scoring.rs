//! Round-end scoring
//!
//! A pure function of the patient and the two readings; no timing involved.

use crate::models::patient::Patient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest per-reading error (mmHg) still graded `Excellent`
pub const EXCELLENT_TOLERANCE: i32 = 3;

/// Largest per-reading error (mmHg) still graded `Good`
pub const GOOD_TOLERANCE: i32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Excellent,
    Good,
    NeedsImprovement,
    /// At least one reading was never marked
    Incomplete,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Excellent => "Excellent",
            Outcome::Good => "Good",
            Outcome::NeedsImprovement => "Needs improvement",
            Outcome::Incomplete => "Incomplete",
        };
        f.write_str(label)
    }
}

/// Graded result of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub outcome: Outcome,

    /// `|true systolic - reading|`, absent if not marked
    pub systolic_diff: Option<i32>,

    /// `|true diastolic - reading|`, absent if not marked
    pub diastolic_diff: Option<i32>,
}

/// Grade the player's readings against the patient
///
/// # Example
/// ```
/// use korotkoff_trainer_core::{compute_feedback, Outcome, Patient};
///
/// let patient = Patient::new(120, 80, 72, 0.9).unwrap();
/// let feedback = compute_feedback(&patient, Some(117), Some(83));
/// assert_eq!(feedback.outcome, Outcome::Excellent);
///
/// let feedback = compute_feedback(&patient, Some(120), None);
/// assert_eq!(feedback.outcome, Outcome::Incomplete);
/// ```
pub fn compute_feedback(
    patient: &Patient,
    player_systolic: Option<i32>,
    player_diastolic: Option<i32>,
) -> Feedback {
    let systolic_diff = player_systolic.map(|s| (patient.systolic() - s).abs());
    let diastolic_diff = player_diastolic.map(|d| (patient.diastolic() - d).abs());

    let outcome = match (systolic_diff, diastolic_diff) {
        (Some(sys), Some(dia)) => grade(sys, dia),
        _ => Outcome::Incomplete,
    };

    Feedback {
        outcome,
        systolic_diff,
        diastolic_diff,
    }
}

fn grade(sys_diff: i32, dia_diff: i32) -> Outcome {
    if sys_diff <= EXCELLENT_TOLERANCE && dia_diff <= EXCELLENT_TOLERANCE {
        Outcome::Excellent
    } else if sys_diff <= GOOD_TOLERANCE && dia_diff <= GOOD_TOLERANCE {
        Outcome::Good
    } else {
        Outcome::NeedsImprovement
    }
}
