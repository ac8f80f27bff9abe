// Reversible model simplification.
//
// Each step mutates the model going forward and knows how to map a
// solution of the simplified model back to the space before it ran. The
// stack applies steps in registration order and must be unwound strictly
// back-to-front; steps never change the variable count, so the scaling
// vector stays index-aligned across the whole pipeline.

use crate::domain::models::MpModel;
use crate::infrastructure::logging::SolverLogger;

const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// What a simplification pass concluded about the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresolveOutcome {
    /// Normal case, proceed to scaling
    Continue,
    /// Some step proved the feasible region empty
    ProvenInfeasible,
    /// A structural issue surfaced during simplification
    ProvenInvalid,
    /// Infeasibility and unboundedness could not be told apart
    InfeasibleOrUnbounded,
}

/// One reversible simplification.
///
/// `apply` runs forward over the model; `recover` maps a per-variable value
/// vector from "after this step" space to "before this step" space.
pub trait PresolveStep {
    fn name(&self) -> &'static str;
    fn apply(&mut self, model: &mut MpModel, logger: &SolverLogger) -> PresolveOutcome;
    fn recover(&self, values: &mut [f64]);
}

/// Owned, ordered history of the steps that ran for one solve call
#[derive(Default)]
pub struct PresolveStack {
    steps: Vec<Box<dyn PresolveStep>>,
}

impl PresolveStack {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(&mut self, step: Box<dyn PresolveStep>) {
        self.steps.push(step);
    }

    /// Undo every applied step over a candidate solution, most recently
    /// applied first. Pure with respect to the stack.
    pub fn recover(&self, values: &mut [f64]) {
        for step in self.steps.iter().rev() {
            step.recover(values);
        }
    }
}

/// Run the standard simplification sequence, collecting the applied steps.
///
/// On any outcome other than `Continue` the pipeline exits early and the
/// partially built stack is dropped unused.
pub fn apply_presolve_steps(
    model: &mut MpModel,
    logger: &SolverLogger,
) -> (PresolveStack, PresolveOutcome) {
    let mut stack = PresolveStack::new();
    let steps: Vec<Box<dyn PresolveStep>> = vec![
        Box::new(FixedVariableStep::new()),
        Box::new(EmptyConstraintStep::new()),
        Box::new(SingletonConstraintStep::new()),
        Box::new(FreeColumnStep),
    ];
    for mut step in steps {
        let outcome = step.apply(model, logger);
        if outcome != PresolveOutcome::Continue {
            logger.log(&format!("MIP presolve: step '{}' stopped early", step.name()));
            return (stack, outcome);
        }
        stack.push(step);
    }
    (stack, PresolveOutcome::Continue)
}

/// Substitutes variables whose bounds pin them to a single value out of
/// every constraint, shifting the row bounds by the fixed contribution.
struct FixedVariableStep {
    fixed: Vec<(usize, f64)>,
}

impl FixedVariableStep {
    fn new() -> Self {
        Self { fixed: Vec::new() }
    }
}

impl PresolveStep for FixedVariableStep {
    fn name(&self) -> &'static str {
        "fixed_variables"
    }

    fn apply(&mut self, model: &mut MpModel, logger: &SolverLogger) -> PresolveOutcome {
        for (var, variable) in model.variables.iter().enumerate() {
            if variable.lower_bound.is_nan() || variable.upper_bound.is_nan() {
                return PresolveOutcome::ProvenInvalid;
            }
            if variable.lower_bound > variable.upper_bound {
                return PresolveOutcome::ProvenInfeasible;
            }
            if variable.lower_bound == variable.upper_bound && variable.lower_bound.is_finite() {
                self.fixed.push((var, variable.lower_bound));
            }
        }
        if self.fixed.is_empty() {
            return PresolveOutcome::Continue;
        }
        for constraint in &mut model.constraints {
            let mut kept_index = Vec::with_capacity(constraint.var_index.len());
            let mut kept_coefficient = Vec::with_capacity(constraint.coefficient.len());
            for (&var, &coefficient) in constraint.var_index.iter().zip(&constraint.coefficient) {
                if let Some(&(_, value)) = self.fixed.iter().find(|&&(v, _)| v == var) {
                    let shift = coefficient * value;
                    constraint.lower_bound -= shift;
                    constraint.upper_bound -= shift;
                } else {
                    kept_index.push(var);
                    kept_coefficient.push(coefficient);
                }
            }
            constraint.var_index = kept_index;
            constraint.coefficient = kept_coefficient;
        }
        logger.log(&format!(
            "MIP presolve: substituted {} fixed variables",
            self.fixed.len()
        ));
        PresolveOutcome::Continue
    }

    fn recover(&self, values: &mut [f64]) {
        for &(var, value) in &self.fixed {
            if var < values.len() {
                values[var] = value;
            }
        }
    }
}

/// Removes constraints with no terms, proving infeasibility when their
/// bounds exclude zero.
struct EmptyConstraintStep {
    num_removed: usize,
}

impl EmptyConstraintStep {
    fn new() -> Self {
        Self { num_removed: 0 }
    }
}

impl PresolveStep for EmptyConstraintStep {
    fn name(&self) -> &'static str {
        "empty_constraints"
    }

    fn apply(&mut self, model: &mut MpModel, logger: &SolverLogger) -> PresolveOutcome {
        for constraint in &model.constraints {
            if constraint.num_terms() == 0
                && (constraint.lower_bound > FEASIBILITY_TOLERANCE
                    || constraint.upper_bound < -FEASIBILITY_TOLERANCE)
            {
                return PresolveOutcome::ProvenInfeasible;
            }
        }
        let before = model.constraints.len();
        model.constraints.retain(|c| c.num_terms() > 0);
        self.num_removed = before - model.constraints.len();
        if self.num_removed > 0 {
            logger.log(&format!(
                "MIP presolve: removed {} empty constraints",
                self.num_removed
            ));
        }
        PresolveOutcome::Continue
    }

    fn recover(&self, _values: &mut [f64]) {
        // Row removals never touch the primal values.
    }
}

/// Folds single-term constraints into the variable bounds and drops the
/// row.
struct SingletonConstraintStep {
    num_folded: usize,
}

impl SingletonConstraintStep {
    fn new() -> Self {
        Self { num_folded: 0 }
    }
}

impl PresolveStep for SingletonConstraintStep {
    fn name(&self) -> &'static str {
        "singleton_constraints"
    }

    fn apply(&mut self, model: &mut MpModel, logger: &SolverLogger) -> PresolveOutcome {
        let mut kept = Vec::with_capacity(model.constraints.len());
        for constraint in std::mem::take(&mut model.constraints) {
            if constraint.num_terms() != 1 {
                kept.push(constraint);
                continue;
            }
            let var = constraint.var_index[0];
            let coefficient = constraint.coefficient[0];
            if coefficient == 0.0 || var >= model.variables.len() {
                kept.push(constraint);
                continue;
            }
            let implied_a = constraint.lower_bound / coefficient;
            let implied_b = constraint.upper_bound / coefficient;
            let (implied_lower, implied_upper) = if coefficient > 0.0 {
                (implied_a, implied_b)
            } else {
                (implied_b, implied_a)
            };
            let variable = &mut model.variables[var];
            variable.lower_bound = variable.lower_bound.max(implied_lower);
            variable.upper_bound = variable.upper_bound.min(implied_upper);
            if variable.lower_bound > variable.upper_bound + FEASIBILITY_TOLERANCE {
                model.constraints = kept;
                return PresolveOutcome::ProvenInfeasible;
            }
            self.num_folded += 1;
        }
        model.constraints = kept;
        if self.num_folded > 0 {
            logger.log(&format!(
                "MIP presolve: folded {} singleton constraints into bounds",
                self.num_folded
            ));
        }
        PresolveOutcome::Continue
    }

    fn recover(&self, _values: &mut [f64]) {
        // Tightened bounds only shrink the feasible set; values are valid
        // as-is in the original space.
    }
}

/// Detects unconstrained variables the objective pushes toward an infinite
/// bound. The model is then infeasible or unbounded and the two cannot be
/// told apart at this point.
struct FreeColumnStep;

impl PresolveStep for FreeColumnStep {
    fn name(&self) -> &'static str {
        "free_columns"
    }

    fn apply(&mut self, model: &mut MpModel, _logger: &SolverLogger) -> PresolveOutcome {
        let mut appears = vec![false; model.variables.len()];
        for constraint in &model.constraints {
            for &var in &constraint.var_index {
                if var < appears.len() {
                    appears[var] = true;
                }
            }
        }
        for (var, variable) in model.variables.iter().enumerate() {
            if appears[var] || variable.objective_coefficient == 0.0 {
                continue;
            }
            let improves_up = variable.objective_coefficient > 0.0;
            let unbounded_direction = if model.maximize == improves_up {
                variable.upper_bound == f64::INFINITY
            } else {
                variable.lower_bound == f64::NEG_INFINITY
            };
            if unbounded_direction {
                return PresolveOutcome::InfeasibleOrUnbounded;
            }
        }
        PresolveOutcome::Continue
    }

    fn recover(&self, _values: &mut [f64]) {}
}
