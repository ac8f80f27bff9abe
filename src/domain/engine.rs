// Domain service interface for the external integer solving engine.
// Defines the contract a back-end must follow; the bridge never looks
// inside the search itself.

use std::sync::atomic::AtomicBool;

use super::cp_model::CpModel;
use super::params::SatParams;

/// One improving solution reported by the engine while it runs
#[derive(Debug, Clone)]
pub struct EngineSolution {
    /// Caller-space objective value, per the [`CpObjective`] contract
    ///
    /// [`CpObjective`]: super::cp_model::CpObjective
    pub objective_value: f64,
    /// Engine-space integer assignment, one value per model variable
    pub values: Vec<i64>,
}

/// Everything the engine reports back from one solve
#[derive(Debug, Clone, Default)]
pub struct EngineResponse {
    /// Raw engine status code; mapped through
    /// [`ResponseStatus::from_engine_code`](super::value_objects::ResponseStatus::from_engine_code)
    pub status: i32,
    pub objective_value: f64,
    pub best_objective_bound: f64,
    /// Primary solution in engine space, empty when none exists
    pub solution: Vec<i64>,
    /// Alternate assignments beyond the primary one, engine order
    pub additional_solutions: Vec<Vec<i64>>,
    pub wall_time_seconds: f64,
    pub user_time_seconds: f64,
}

/// Per-call hooks handed to the engine.
///
/// The interrupt flag is only registered here; the engine checks it at its
/// own granularity. The observer runs synchronously on the engine's call
/// stack for every improving solution and must be cheap: the engine does
/// not resume until it returns, and it must not re-enter the pipeline.
pub struct SolveSession<'a> {
    pub interrupt: Option<&'a AtomicBool>,
    pub observer: Option<&'a mut dyn FnMut(&EngineSolution)>,
}

impl<'a> SolveSession<'a> {
    pub fn new() -> Self {
        Self {
            interrupt: None,
            observer: None,
        }
    }

    /// Forward an improving solution to the registered observer, if any.
    pub fn report_solution(&mut self, solution: &EngineSolution) {
        if let Some(observer) = self.observer.as_mut() {
            observer(solution);
        }
    }
}

impl<'a> Default for SolveSession<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Contract for the external combinatorial solving engine.
///
/// Implementations receive a fully integral, bounded model and the merged
/// parameters; how they search is opaque to this layer.
pub trait CpEngine: Send + Sync {
    fn solve(
        &self,
        model: &CpModel,
        params: &SatParams,
        session: &mut SolveSession<'_>,
    ) -> EngineResponse;

    /// Name of this engine back-end
    fn name(&self) -> &str;
}
