// Domain layer: the two model spaces, statuses, parameters and the
// engine contract

pub mod cp_model;
pub mod engine;
pub mod models;
pub mod params;
pub mod value_objects;

pub use cp_model::{CpLinearConstraint, CpModel, CpObjective, CpSolutionHint, CpVariable};
pub use engine::{CpEngine, EngineResponse, EngineSolution, SolveSession};
pub use models::{
    MpConstraint, MpModel, MpSolution, MpVariable, SolutionHint, SolveInfo, SolveRequest,
    SolveResponse,
};
pub use params::{validate_params, SatParams};
pub use value_objects::{CpSolverStatus, ResponseStatus};
