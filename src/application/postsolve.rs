// Postsolve: map an engine-space solution back into the caller's original
// variable space by undoing scaling, then the presolve steps in reverse.

use crate::domain::models::MpSolution;

use super::presolve::PresolveStack;

/// Reconstruct an original-space solution from engine-space values.
///
/// Deterministic and pure: neither the stack nor the scaling vector is
/// mutated, so the same reconstruction serves streamed intermediate
/// solutions and the final one alike.
pub fn postsolve_solution(
    values: &[i64],
    objective_value: f64,
    var_scaling: &[f64],
    stack: &PresolveStack,
) -> MpSolution {
    // A length mismatch between stages is a pipeline bug, not user error.
    debug_assert_eq!(values.len(), var_scaling.len());

    let mut variable_values: Vec<f64> = values
        .iter()
        .zip(var_scaling)
        .map(|(&value, &scaling)| value as f64 / scaling)
        .collect();
    stack.recover(&mut variable_values);

    MpSolution {
        objective_value,
        variable_values,
    }
}
