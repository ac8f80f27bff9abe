// Domain models for the caller-facing (mixed-integer, floating-point) side
// of the bridge

use super::value_objects::ResponseStatus;

/// Decision variable of the incoming model
#[derive(Debug, Clone)]
pub struct MpVariable {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub objective_coefficient: f64,
    pub is_integer: bool,
    pub name: String,
}

impl MpVariable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
            objective_coefficient: 0.0,
            is_integer: false,
            name: name.into(),
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            is_integer: true,
            ..Self::continuous(name)
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn with_objective(mut self, coefficient: f64) -> Self {
        self.objective_coefficient = coefficient;
        self
    }
}

/// Sparse linear constraint: `lower_bound <= sum(coefficient * x[var_index]) <= upper_bound`
#[derive(Debug, Clone)]
pub struct MpConstraint {
    pub var_index: Vec<usize>,
    pub coefficient: Vec<f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub name: String,
}

impl MpConstraint {
    pub fn new(var_index: Vec<usize>, coefficient: Vec<f64>, lower: f64, upper: f64) -> Self {
        Self {
            var_index,
            coefficient,
            lower_bound: lower,
            upper_bound: upper,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_terms(&self) -> usize {
        self.var_index.len()
    }
}

/// Advisory partial assignment guiding the engine's search.
///
/// Stored as parallel index/value lists; entries are a seed, not a
/// constraint, and may reference variables that no longer exist.
#[derive(Debug, Clone, Default)]
pub struct SolutionHint {
    pub var_index: Vec<usize>,
    pub var_value: Vec<f64>,
}

/// Complete mixed-integer model as submitted by the caller
#[derive(Debug, Clone, Default)]
pub struct MpModel {
    pub maximize: bool,
    pub objective_offset: f64,
    pub variables: Vec<MpVariable>,
    pub constraints: Vec<MpConstraint>,
    pub solution_hint: Option<SolutionHint>,
}

impl MpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maximize(mut self) -> Self {
        self.maximize = true;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.objective_offset = offset;
        self
    }

    pub fn add_variable(mut self, variable: MpVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn add_constraint(mut self, constraint: MpConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_hint(mut self, hint: SolutionHint) -> Self {
        self.solution_hint = Some(hint);
        self
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_fully_integer(&self) -> bool {
        self.variables.iter().all(|v| v.is_integer)
    }
}

/// One solve request: the model plus solver-level options.
///
/// `solver_parameters` is an opaque encoded blob; its encoding (binary or
/// textual) is fixed by the build flavor, see `application::params`.
#[derive(Debug, Clone, Default)]
pub struct SolveRequest {
    pub model: MpModel,
    pub solver_parameters: Option<Vec<u8>>,
    pub time_limit_seconds: Option<f64>,
    pub enable_internal_solver_output: bool,
}

impl SolveRequest {
    pub fn new(model: MpModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn with_solver_parameters(mut self, blob: Vec<u8>) -> Self {
        self.solver_parameters = Some(blob);
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    pub fn with_internal_solver_output(mut self, enabled: bool) -> Self {
        self.enable_internal_solver_output = enabled;
        self
    }
}

/// A solution in the caller's original variable space
#[derive(Debug, Clone, PartialEq)]
pub struct MpSolution {
    pub objective_value: f64,
    pub variable_values: Vec<f64>,
}

/// Timing spent inside the external engine only
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveInfo {
    pub solve_wall_time_seconds: f64,
    pub solve_user_time_seconds: f64,
}

/// Final result of a solve request
#[derive(Debug, Clone)]
pub struct SolveResponse {
    pub status: ResponseStatus,
    pub status_str: String,
    pub objective_value: Option<f64>,
    pub best_objective_bound: Option<f64>,
    /// Per-variable values in the original space, empty unless the status
    /// carries a solution
    pub variable_values: Vec<f64>,
    pub additional_solutions: Vec<MpSolution>,
    pub solve_info: SolveInfo,
}

impl SolveResponse {
    pub fn new(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            status_str: message.into(),
            objective_value: None,
            best_objective_bound: None,
            variable_values: Vec::new(),
            additional_solutions: Vec::new(),
            solve_info: SolveInfo::default(),
        }
    }
}
