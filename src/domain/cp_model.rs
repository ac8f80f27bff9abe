// The integer-only model consumed by the external engine.
// Every variable corresponds 1:1 by index to the scaled original variable.

/// Bounded integer variable of the engine model
#[derive(Debug, Clone)]
pub struct CpVariable {
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub name: String,
}

/// Sparse linear constraint over integer variables
#[derive(Debug, Clone)]
pub struct CpLinearConstraint {
    pub var_index: Vec<usize>,
    pub coefficient: Vec<i64>,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

/// Linearized objective.
///
/// The engine always minimizes `sum(coefficient * value)`. The caller-space
/// objective is `scaling_factor * sum + offset`; an unset (zero) scaling
/// factor reads as one. Maximization is encoded by a negative scaling
/// factor.
#[derive(Debug, Clone, Default)]
pub struct CpObjective {
    pub var_index: Vec<usize>,
    pub coefficient: Vec<i64>,
    pub offset: f64,
    pub scaling_factor: f64,
}

/// Search seed in engine space
#[derive(Debug, Clone, Default)]
pub struct CpSolutionHint {
    pub var_index: Vec<usize>,
    pub values: Vec<i64>,
}

/// The converted model handed to the engine
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    pub variables: Vec<CpVariable>,
    pub constraints: Vec<CpLinearConstraint>,
    pub objective: CpObjective,
    pub solution_hint: Option<CpSolutionHint>,
}

impl CpModel {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn has_objective(&self) -> bool {
        !self.objective.var_index.is_empty() || self.objective.offset != 0.0
    }

    /// Caller-space objective value of an engine-space assignment, computed
    /// from the model's own terms and declared scaling factor.
    pub fn objective_value_of(&self, values: &[i64]) -> f64 {
        let mut sum = 0.0;
        for (&var, &coefficient) in self.objective.var_index.iter().zip(&self.objective.coefficient)
        {
            sum += values[var] as f64 * coefficient as f64;
        }
        let scaling = if self.objective.scaling_factor != 0.0 {
            self.objective.scaling_factor
        } else {
            1.0
        };
        scaling * sum + self.objective.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_value_applies_scaling_and_offset() {
        let model = CpModel {
            objective: CpObjective {
                var_index: vec![0, 1],
                coefficient: vec![2, 3],
                offset: 1.5,
                scaling_factor: 0.5,
            },
            ..CpModel::default()
        };
        // 0.5 * (2*4 + 3*2) + 1.5 = 8.5
        assert_eq!(model.objective_value_of(&[4, 2]), 8.5);
    }

    #[test]
    fn zero_scaling_factor_reads_as_one() {
        let model = CpModel {
            objective: CpObjective {
                var_index: vec![0],
                coefficient: vec![5],
                offset: 0.0,
                scaling_factor: 0.0,
            },
            ..CpModel::default()
        };
        assert_eq!(model.objective_value_of(&[3]), 15.0);
    }

    #[test]
    fn offset_only_objective_counts_as_objective() {
        let model = CpModel {
            objective: CpObjective {
                offset: 2.0,
                ..CpObjective::default()
            },
            ..CpModel::default()
        };
        assert!(model.has_objective());
        assert!(!CpModel::default().has_objective());
    }
}
