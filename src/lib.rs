// Domain layer: Models, parameters and the engine contract
pub mod domain;

// Application layer: The solve pipeline and its stages
pub mod application;

// Infrastructure layer: External concerns (logging)
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    CpEngine, CpModel, CpObjective, CpSolverStatus, EngineResponse, EngineSolution, MpConstraint,
    MpModel, MpSolution, MpVariable, ResponseStatus, SatParams, SolutionHint, SolveRequest,
    SolveResponse, SolveSession,
};

pub use application::{SatPipeline, SolveError, SolveHooks};

pub use infrastructure::SolverLogger;
