// Domain value objects: statuses of the two solve spaces and the mappings
// between them

use std::fmt;

/// Status reported on the final response, in the caller's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Solve did not run or produced no usable answer
    NotSolved,
    /// The model failed structural or conversion checks
    ModelInvalid,
    /// A feasible (not proven optimal) solution was found
    Feasible,
    /// The feasible region is provably empty
    Infeasible,
    /// An optimal solution was found
    Optimal,
    /// The engine returned a status this layer does not recognize
    Abnormal,
    /// Neither feasibility nor infeasibility could be established
    Unknown,
}

impl ResponseStatus {
    /// True when the response carries a usable solution vector.
    pub fn has_solution(self) -> bool {
        matches!(self, ResponseStatus::Feasible | ResponseStatus::Optimal)
    }

    /// Classify a raw engine status code.
    ///
    /// Codes outside the recognized set map to [`ResponseStatus::Abnormal`];
    /// that classification is never upgraded to a stronger guarantee.
    pub fn from_engine_code(code: i32) -> Self {
        match CpSolverStatus::try_from(code) {
            Ok(CpSolverStatus::Unknown) => ResponseStatus::NotSolved,
            Ok(CpSolverStatus::ModelInvalid) => ResponseStatus::ModelInvalid,
            Ok(CpSolverStatus::Feasible) => ResponseStatus::Feasible,
            Ok(CpSolverStatus::Infeasible) => ResponseStatus::Infeasible,
            Ok(CpSolverStatus::Optimal) => ResponseStatus::Optimal,
            Err(_) => ResponseStatus::Abnormal,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::NotSolved => write!(f, "Not Solved"),
            ResponseStatus::ModelInvalid => write!(f, "Model Invalid"),
            ResponseStatus::Feasible => write!(f, "Feasible"),
            ResponseStatus::Infeasible => write!(f, "Infeasible"),
            ResponseStatus::Optimal => write!(f, "Optimal"),
            ResponseStatus::Abnormal => write!(f, "Abnormal"),
            ResponseStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Status in the integer engine's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpSolverStatus {
    Unknown = 0,
    ModelInvalid = 1,
    Feasible = 2,
    Infeasible = 3,
    Optimal = 4,
}

impl CpSolverStatus {
    /// Engine-side rendering of a status the pipeline decided on its own,
    /// used so early-exit paths still log a consistent status line.
    pub fn from_response_status(status: ResponseStatus) -> Self {
        match status {
            ResponseStatus::Optimal => CpSolverStatus::Optimal,
            ResponseStatus::Infeasible => CpSolverStatus::Infeasible,
            ResponseStatus::ModelInvalid => CpSolverStatus::ModelInvalid,
            _ => CpSolverStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CpSolverStatus::Unknown => "UNKNOWN",
            CpSolverStatus::ModelInvalid => "MODEL_INVALID",
            CpSolverStatus::Feasible => "FEASIBLE",
            CpSolverStatus::Infeasible => "INFEASIBLE",
            CpSolverStatus::Optimal => "OPTIMAL",
        }
    }
}

impl TryFrom<i32> for CpSolverStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CpSolverStatus::Unknown),
            1 => Ok(CpSolverStatus::ModelInvalid),
            2 => Ok(CpSolverStatus::Feasible),
            3 => Ok(CpSolverStatus::Infeasible),
            4 => Ok(CpSolverStatus::Optimal),
            other => Err(other),
        }
    }
}

impl fmt::Display for CpSolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_codes_map_to_response_statuses() {
        assert_eq!(
            ResponseStatus::from_engine_code(0),
            ResponseStatus::NotSolved
        );
        assert_eq!(
            ResponseStatus::from_engine_code(1),
            ResponseStatus::ModelInvalid
        );
        assert_eq!(ResponseStatus::from_engine_code(2), ResponseStatus::Feasible);
        assert_eq!(
            ResponseStatus::from_engine_code(3),
            ResponseStatus::Infeasible
        );
        assert_eq!(ResponseStatus::from_engine_code(4), ResponseStatus::Optimal);
    }

    #[test]
    fn unrecognized_engine_code_is_abnormal() {
        assert_eq!(
            ResponseStatus::from_engine_code(99),
            ResponseStatus::Abnormal
        );
        assert_eq!(
            ResponseStatus::from_engine_code(-1),
            ResponseStatus::Abnormal
        );
    }

    #[test]
    fn reverse_mapping_weakens_to_unknown() {
        assert_eq!(
            CpSolverStatus::from_response_status(ResponseStatus::Optimal),
            CpSolverStatus::Optimal
        );
        assert_eq!(
            CpSolverStatus::from_response_status(ResponseStatus::Infeasible),
            CpSolverStatus::Infeasible
        );
        assert_eq!(
            CpSolverStatus::from_response_status(ResponseStatus::ModelInvalid),
            CpSolverStatus::ModelInvalid
        );
        assert_eq!(
            CpSolverStatus::from_response_status(ResponseStatus::Feasible),
            CpSolverStatus::Unknown
        );
        assert_eq!(
            CpSolverStatus::from_response_status(ResponseStatus::Abnormal),
            CpSolverStatus::Unknown
        );
    }
}
