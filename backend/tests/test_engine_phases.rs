//! Tests for the round state machine
//!
//! Reference patient: 120/80 mmHg at 60 bpm. With default pacing the cuff
//! reaches 150 mmHg after 30 inflation ticks (t = 1 500 ms), then loses
//! 0.125 mmHg per 50 ms tick, reaching the 65 mmHg floor 680 ticks later
//! (t = 35 500 ms).

use korotkoff_trainer_core::audio::{NullSink, SoundSynthesizer};
use korotkoff_trainer_core::{
    EngineConfig, Event, ManualClock, Outcome, Patient, Phase, RngManager, SimulationEngine,
    SimulationError,
};

const INFLATED_AT_MS: f64 = 1_500.0;
const FINISHED_AT_MS: f64 = 35_500.0;

fn engine(clock: &ManualClock) -> SimulationEngine {
    SimulationEngine::with_parts(
        EngineConfig::default(),
        Box::new(clock.clone()),
        Box::new(RngManager::new(1)),
        SoundSynthesizer::new(Box::new(NullSink), 2),
    )
    .unwrap()
}

fn reference_patient() -> Patient {
    Patient::new(120, 80, 60, 0.9).unwrap()
}

/// Move the clock to `t_ms` and run every tick due by then
fn run_until(engine: &mut SimulationEngine, clock: &ManualClock, t_ms: f64) {
    clock.set(t_ms);
    engine.pump();
}

#[test]
fn test_new_engine_is_idle() {
    let clock = ManualClock::new();
    let engine = engine(&clock);

    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.pressure(), 0.0);
    assert!(engine.patient().is_none());
    assert!(engine.feedback().is_none());
    assert!(!engine.has_live_timer());
}

#[test]
fn test_inflation_ends_at_150_after_30_ticks() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());
    assert_eq!(engine.phase(), Phase::Inflating);

    let mut ticks = 0;
    while engine.phase() == Phase::Inflating {
        clock.advance(50.0);
        let results = engine.pump();
        assert_eq!(results.len(), 1);
        ticks += 1;

        if ticks < 30 {
            assert_eq!(results[0].pressure, 5.0 * ticks as f64);
        }
        assert!(ticks <= 30, "inflation overran");
    }

    assert_eq!(ticks, 30);
    assert_eq!(engine.pressure(), 150.0);
    assert_eq!(engine.phase(), Phase::Deflating);
    assert_eq!(clock_now(&clock), INFLATED_AT_MS);
}

fn clock_now(clock: &ManualClock) -> f64 {
    use korotkoff_trainer_core::Clock;
    clock.now_ms()
}

#[test]
fn test_inflation_clamps_to_target() {
    // 121 + 30 = 151 is not a multiple of 5; the ramp stops exactly on it
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(Patient::new(121, 80, 60, 0.9).unwrap());

    run_until(&mut engine, &clock, 1_550.0);
    assert_eq!(engine.phase(), Phase::Deflating);
    assert_eq!(engine.pressure(), 151.0);
}

#[test]
fn test_deflation_ends_at_diastolic_minus_15() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());
    run_until(&mut engine, &clock, INFLATED_AT_MS);

    let mut deflation_ticks = 0;
    let mut previous = engine.pressure();
    while engine.phase() == Phase::Deflating {
        clock.advance(50.0);
        for tick in engine.pump() {
            assert_eq!(previous - tick.pressure, 0.125);
            if tick.phase == Phase::Deflating {
                assert!(tick.pressure > 65.0);
            }
            previous = tick.pressure;
            deflation_ticks += 1;
        }
        assert!(deflation_ticks <= 680, "deflation overran");
    }

    assert_eq!(deflation_ticks, 680);
    assert_eq!(engine.phase(), Phase::Finished);
    assert_eq!(engine.pressure(), 65.0);
}

#[test]
fn test_phase_sequence() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);

    let transitions = |engine: &SimulationEngine| -> Vec<(Phase, Phase)> {
        engine
            .event_log()
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::PhaseChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    };

    engine.start_round_with(reference_patient());
    run_until(&mut engine, &clock, FINISHED_AT_MS);
    assert_eq!(
        transitions(&engine),
        vec![
            (Phase::Idle, Phase::Inflating),
            (Phase::Inflating, Phase::Deflating),
            (Phase::Deflating, Phase::Finished),
        ]
    );

    engine.start_round_with(reference_patient());
    assert_eq!(transitions(&engine), vec![(Phase::Finished, Phase::Inflating)]);
}

#[test]
fn test_finished_is_frozen() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());
    run_until(&mut engine, &clock, FINISHED_AT_MS);
    assert_eq!(engine.phase(), Phase::Finished);

    let events_before = engine.event_log().len();
    run_until(&mut engine, &clock, FINISHED_AT_MS + 60_000.0);

    assert_eq!(engine.pressure(), 65.0);
    assert_eq!(engine.mark_systolic(), None);
    assert_eq!(engine.mark_diastolic(), None);
    assert!(!engine.has_live_timer());
    assert_eq!(engine.armed_timer_count(), 0);
    assert_eq!(engine.event_log().len(), events_before);
}

#[test]
fn test_marks_ignored_outside_deflation() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);

    assert_eq!(engine.mark_systolic(), None);

    engine.start_round_with(reference_patient());
    run_until(&mut engine, &clock, 500.0);
    assert_eq!(engine.phase(), Phase::Inflating);
    assert_eq!(engine.mark_systolic(), None);
    assert_eq!(engine.mark_diastolic(), None);

    assert!(engine.player_systolic().is_none());
    assert!(engine.player_diastolic().is_none());
}

#[test]
fn test_mark_systolic_is_idempotent() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());

    // 120 mmHg is reached 240 deflation ticks after 1 500 ms
    run_until(&mut engine, &clock, 13_500.0);
    assert_eq!(engine.mark_systolic(), Some(120));

    run_until(&mut engine, &clock, 14_500.0);
    assert_eq!(engine.pressure(), 117.5);
    assert_eq!(engine.mark_systolic(), None);
    assert_eq!(engine.player_systolic(), Some(120));

    let marks = engine.event_log().events_of_type("ReadingMarked");
    assert_eq!(marks.len(), 1);
}

#[test]
fn test_mark_after_floor_time_is_rejected_without_pump() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());

    run_until(&mut engine, &clock, 13_500.0);
    assert_eq!(engine.mark_systolic(), Some(120));

    // The round ended at 35 500 ms; nothing has pumped since 13 500 ms
    clock.set(40_000.0);
    assert_eq!(engine.mark_diastolic(), None);
    assert_eq!(engine.phase(), Phase::Finished);
    assert_eq!(engine.player_diastolic(), None);
    assert_eq!(
        engine.feedback().map(|f| f.outcome),
        Some(Outcome::Incomplete)
    );
}

#[test]
fn test_mark_reads_pressure_at_current_clock() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());
    run_until(&mut engine, &clock, 13_000.0);

    // 14 500 ms is 260 deflation ticks in: 117.5 mmHg
    clock.set(14_500.0);
    assert_eq!(engine.mark_systolic(), Some(118));
    assert_eq!(engine.pressure(), 117.5);
}

#[test]
fn test_mark_during_inflation_catches_up_first() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());

    // Stale state says Inflating, the clock says Deflating at 145 mmHg
    clock.set(INFLATED_AT_MS + 2_000.0);
    assert_eq!(engine.mark_systolic(), Some(145));
}

#[test]
fn test_accurate_readings_score_excellent() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());

    run_until(&mut engine, &clock, 13_600.0); // 119.75 mmHg
    assert_eq!(engine.mark_systolic(), Some(120));

    run_until(&mut engine, &clock, 29_600.0); // 79.75 mmHg
    assert_eq!(engine.mark_diastolic(), Some(80));

    run_until(&mut engine, &clock, FINISHED_AT_MS);
    let feedback = engine.feedback().expect("round should be scored");
    assert_eq!(feedback.outcome, Outcome::Excellent);

    let finished = engine.event_log().events_of_type("RoundFinished");
    assert_eq!(finished.len(), 1);
}

#[test]
fn test_unmarked_round_is_incomplete() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round_with(reference_patient());
    run_until(&mut engine, &clock, FINISHED_AT_MS);

    assert_eq!(
        engine.feedback().map(|f| f.outcome),
        Some(Outcome::Incomplete)
    );
}

#[test]
fn test_late_pump_matches_stepwise_pump() {
    let stepwise_clock = ManualClock::new();
    let mut stepwise = engine(&stepwise_clock);
    stepwise.start_round_with(reference_patient());

    let mut stepwise_ticks = Vec::new();
    while stepwise.phase() != Phase::Finished {
        stepwise_clock.advance(50.0);
        stepwise_ticks.extend(stepwise.pump());
    }

    let late_clock = ManualClock::new();
    let mut late = engine(&late_clock);
    late.start_round_with(reference_patient());
    late_clock.advance(60_000.0);
    let late_ticks = late.pump();

    assert_eq!(stepwise_ticks, late_ticks);
    assert_eq!(late.phase(), Phase::Finished);
}

#[test]
fn test_pressure_never_negative() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start_round();
    clock.advance(120_000.0);

    for tick in engine.pump() {
        assert!(tick.pressure >= 0.0);
    }
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config = EngineConfig::from_json(r#"{ "deflation_rate_mmhg_s": 5.0 }"#).unwrap();
    assert_eq!(config.deflation_step_mmhg(), 0.25);
    assert_eq!(config.inflation_step_mmhg, 5.0);
}

#[test]
fn test_config_rejects_unknown_fields() {
    let err = EngineConfig::from_json(r#"{ "tick_ms": 10 }"#).unwrap_err();
    assert!(matches!(err, SimulationError::ConfigParse(_)));
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let config = EngineConfig {
        inflation_step_mmhg: -5.0,
        ..Default::default()
    };
    let result = SimulationEngine::with_parts(
        config,
        Box::new(ManualClock::new()),
        Box::new(RngManager::new(1)),
        SoundSynthesizer::new(Box::new(NullSink), 2),
    );
    assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
}
