//! Tests for round-end scoring boundaries

use korotkoff_trainer_core::{compute_feedback, Outcome, Patient};

fn patient() -> Patient {
    Patient::new(120, 80, 60, 0.9).unwrap()
}

#[test]
fn test_exact_readings_are_excellent() {
    let feedback = compute_feedback(&patient(), Some(120), Some(80));
    assert_eq!(feedback.outcome, Outcome::Excellent);
    assert_eq!(feedback.systolic_diff, Some(0));
    assert_eq!(feedback.diastolic_diff, Some(0));
}

#[test]
fn test_three_mmhg_is_still_excellent() {
    let feedback = compute_feedback(&patient(), Some(123), Some(77));
    assert_eq!(feedback.outcome, Outcome::Excellent);
}

#[test]
fn test_four_mmhg_drops_to_good() {
    let feedback = compute_feedback(&patient(), Some(124), Some(80));
    assert_eq!(feedback.outcome, Outcome::Good);
}

#[test]
fn test_seven_mmhg_is_still_good() {
    let feedback = compute_feedback(&patient(), Some(113), Some(87));
    assert_eq!(feedback.outcome, Outcome::Good);
    assert_eq!(feedback.systolic_diff, Some(7));
    assert_eq!(feedback.diastolic_diff, Some(7));
}

#[test]
fn test_eight_mmhg_systolic_needs_improvement() {
    for dia in [80, 83, 87, 100] {
        let feedback = compute_feedback(&patient(), Some(128), Some(dia));
        assert_eq!(
            feedback.outcome,
            Outcome::NeedsImprovement,
            "diastolic reading {}",
            dia
        );
    }
}

#[test]
fn test_missing_reading_is_incomplete() {
    let p = patient();
    assert_eq!(compute_feedback(&p, None, Some(80)).outcome, Outcome::Incomplete);
    assert_eq!(compute_feedback(&p, Some(120), None).outcome, Outcome::Incomplete);
    assert_eq!(compute_feedback(&p, None, None).outcome, Outcome::Incomplete);
}

#[test]
fn test_incomplete_keeps_the_diff_it_has() {
    let feedback = compute_feedback(&patient(), Some(125), None);
    assert_eq!(feedback.systolic_diff, Some(5));
    assert_eq!(feedback.diastolic_diff, None);
}
