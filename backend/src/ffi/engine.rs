//! PyO3 wrapper for SimulationEngine

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::gauge;
use crate::models::Patient;
use crate::orchestrator::{EngineConfig, SimulationEngine};

/// Python wrapper for the Rust engine
///
/// # Example (from Python)
///
/// ```python
/// from korotkoff_trainer_core import SimulationEngine
///
/// engine = SimulationEngine('{"rng_seed": 7}')
/// engine.start_round()
/// while engine.phase != "finished":
///     engine.pump()
///     if user_heard_first_sound():
///         engine.mark_systolic()
/// print(engine.outcome)
/// ```
#[pyclass(name = "SimulationEngine", unsendable)]
pub struct PySimulationEngine {
    inner: SimulationEngine,
}

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pymethods]
impl PySimulationEngine {
    /// Create an engine from an optional JSON config string
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(json).map_err(value_error)?,
            None => EngineConfig::default(),
        };
        let inner = SimulationEngine::new(config).map_err(value_error)?;
        Ok(Self { inner })
    }

    fn start_round(&mut self) {
        self.inner.start_round();
    }

    /// Start a round with explicit vitals
    ///
    /// Raises ValueError if the vitals break a patient invariant.
    fn start_round_with(
        &mut self,
        systolic: i32,
        diastolic: i32,
        heart_rate_bpm: u32,
        sound_clarity: f64,
    ) -> PyResult<()> {
        let patient = Patient::new(systolic, diastolic, heart_rate_bpm, sound_clarity)
            .map_err(value_error)?;
        self.inner.start_round_with(patient);
        Ok(())
    }

    fn mark_systolic(&mut self) -> Option<i32> {
        self.inner.mark_systolic()
    }

    fn mark_diastolic(&mut self) -> Option<i32> {
        self.inner.mark_diastolic()
    }

    /// Run all due ticks; returns how many ran
    fn pump(&mut self) -> usize {
        self.inner.pump().len()
    }

    #[getter]
    fn phase(&self) -> String {
        self.inner.phase().to_string()
    }

    #[getter]
    fn pressure(&self) -> f64 {
        self.inner.pressure()
    }

    #[getter]
    fn needle_angle(&self) -> f64 {
        gauge::needle_angle(self.inner.pressure())
    }

    #[getter]
    fn player_systolic(&self) -> Option<i32> {
        self.inner.player_systolic()
    }

    #[getter]
    fn player_diastolic(&self) -> Option<i32> {
        self.inner.player_diastolic()
    }

    /// Outcome label once the round is finished
    #[getter]
    fn outcome(&self) -> Option<String> {
        self.inner.feedback().map(|f| f.outcome.to_string())
    }
}
