// Application layer: the request -> presolve -> scale -> convert -> solve
// -> postsolve pipeline and its supporting use cases

pub mod mappers;
pub mod params;
pub mod pipeline;
pub mod postsolve;
pub mod presolve;
pub mod scaling;

pub use pipeline::{SatPipeline, SolveHooks};

/// Errors that cross the pipeline boundary.
///
/// Everything else (invalid models, infeasibility, engine oddities) is a
/// valid outcome and travels as a status on the response.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// Malformed or out-of-range solver configuration, detected before any
    /// model work; recoverable by the caller fixing inputs
    #[error("invalid solver parameters: {0}")]
    InvalidParameters(String),
}
