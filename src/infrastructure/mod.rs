// Infrastructure layer: external concerns (logging sink)

pub mod logging;

pub use logging::SolverLogger;
