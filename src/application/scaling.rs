// Scaling stage: turns every variable's domain into something an
// integer-only engine can hold without overflowing the configured bound.
//
// Three passes, all mutating the model in place and feeding the per-call
// scaling vector: inward rounding of integer bounds, implied-integer
// detection, and uniform scaling of the remaining continuous variables.

use crate::domain::models::MpModel;
use crate::domain::params::SatParams;
use crate::infrastructure::logging::SolverLogger;

/// An integer variable whose domain became empty during bound rounding
#[derive(Debug, Clone)]
pub struct EmptyDomain {
    pub variable: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Round the bounds of every integer variable inward to integer values.
///
/// Bounds within `mip_wanted_precision` of an integer snap to it instead of
/// crossing it. An empty domain is a proof of infeasibility and reports the
/// offending variable.
pub fn integerize_bounds(
    params: &SatParams,
    model: &mut MpModel,
    logger: &SolverLogger,
) -> Result<(), EmptyDomain> {
    let precision = params.mip_wanted_precision();
    let mut num_changes = 0usize;
    for variable in &mut model.variables {
        if !variable.is_integer {
            continue;
        }
        let lower = if variable.lower_bound.is_finite() {
            (variable.lower_bound - precision).ceil()
        } else {
            variable.lower_bound
        };
        let upper = if variable.upper_bound.is_finite() {
            (variable.upper_bound + precision).floor()
        } else {
            variable.upper_bound
        };
        if lower != variable.lower_bound || upper != variable.upper_bound {
            num_changes += 1;
        }
        if lower > upper {
            return Err(EmptyDomain {
                variable: variable.name.clone(),
                lower_bound: lower,
                upper_bound: upper,
            });
        }
        variable.lower_bound = lower;
        variable.upper_bound = upper;
    }
    if num_changes > 0 {
        logger.log(&format!(
            "Rounded bounds of {num_changes} integer variables to integer values"
        ));
    }
    Ok(())
}

/// Detect continuous variables that can only take integral multiples of
/// some step, flag them integer, and fold the integerizing factor into the
/// model.
///
/// A continuous variable qualifies when every row it appears in is an
/// equality with an integral right-hand side, integral coefficients, and no
/// other continuous variable. Its step is then `1/g` for `g` the gcd of its
/// own coefficients, so scaling by `g` makes the domain integral. Promotion
/// is skipped when the scaled bounds would overflow `mip_max_bound`.
///
/// Returns one factor per variable (1.0 where nothing changed).
pub fn detect_implied_integers(
    params: &SatParams,
    model: &mut MpModel,
    logger: &SolverLogger,
) -> Vec<f64> {
    const COEFF_TOLERANCE: f64 = 1e-9;
    let max_bound = params.mip_max_bound();
    let num_variables = model.num_variables();
    let mut scaling = vec![1.0; num_variables];

    // Appearances of each variable, and which rows qualify.
    let mut rows_of_var: Vec<Vec<usize>> = vec![Vec::new(); num_variables];
    let mut row_qualifies = vec![false; model.num_constraints()];
    for (row, constraint) in model.constraints.iter().enumerate() {
        for &var in &constraint.var_index {
            if var < num_variables {
                rows_of_var[var].push(row);
            }
        }
        let is_integral_equality = constraint.lower_bound == constraint.upper_bound
            && constraint.lower_bound.is_finite()
            && is_integral(constraint.lower_bound, COEFF_TOLERANCE)
            && constraint
                .coefficient
                .iter()
                .all(|&c| is_integral(c, COEFF_TOLERANCE));
        let num_continuous = constraint
            .var_index
            .iter()
            .filter(|&&v| v < num_variables && !model.variables[v].is_integer)
            .count();
        row_qualifies[row] = is_integral_equality && num_continuous == 1;
    }

    let mut num_detected = 0usize;
    for var in 0..num_variables {
        if model.variables[var].is_integer || rows_of_var[var].is_empty() {
            continue;
        }
        if !rows_of_var[var].iter().all(|&row| row_qualifies[row]) {
            continue;
        }
        let mut gcd_of_coefficients: u64 = 0;
        for &row in &rows_of_var[var] {
            let constraint = &model.constraints[row];
            let position = constraint.var_index.iter().position(|&v| v == var);
            let coefficient = match position {
                Some(p) => constraint.coefficient[p].abs().round(),
                None => continue,
            };
            if coefficient < 1.0 || coefficient > max_bound {
                gcd_of_coefficients = 0;
                break;
            }
            gcd_of_coefficients = gcd(gcd_of_coefficients, coefficient as u64);
        }
        if gcd_of_coefficients == 0 {
            continue;
        }
        let factor = gcd_of_coefficients as f64;
        let variable = &model.variables[var];
        let scaled_magnitude = [variable.lower_bound, variable.upper_bound]
            .iter()
            .filter(|b| b.is_finite())
            .fold(0.0f64, |acc, b| acc.max(b.abs() * factor));
        if scaled_magnitude > max_bound {
            continue;
        }

        apply_variable_factor(model, var, factor);
        model.variables[var].is_integer = true;
        scaling[var] = factor;
        num_detected += 1;
    }

    if num_detected > 0 {
        logger.log(&format!("Detected {num_detected} implied integer variables"));
    }
    scaling
}

/// Scale every still-continuous variable by a uniform factor, reduced per
/// variable so scaled bound magnitudes never exceed `max_bound`.
///
/// Pass an infinite `max_bound` for the unbounded-domain policy. Returns
/// one factor per variable (1.0 for integer variables); callers combine it
/// into their scaling vector by elementwise multiplication.
pub fn scale_continuous_variables(scaling: f64, max_bound: f64, model: &mut MpModel) -> Vec<f64> {
    let num_variables = model.num_variables();
    let mut factors = vec![1.0; num_variables];
    for var in 0..num_variables {
        if model.variables[var].is_integer {
            continue;
        }
        let variable = &model.variables[var];
        let bound_magnitude = [variable.lower_bound, variable.upper_bound]
            .iter()
            .filter(|b| b.is_finite())
            .fold(0.0f64, |acc, b| acc.max(b.abs()));
        let mut factor = scaling;
        if max_bound.is_finite() && bound_magnitude * factor > max_bound && bound_magnitude > 0.0 {
            factor = max_bound / bound_magnitude;
        }
        if factor == 1.0 {
            continue;
        }
        apply_variable_factor(model, var, factor);
        factors[var] = factor;
    }
    factors
}

/// Drop coefficients too small to matter before they poison the integer
/// conversion. Runs on both constraints and the objective.
pub fn remove_near_zero_terms(params: &SatParams, model: &mut MpModel, logger: &SolverLogger) {
    let tolerance = params.mip_drop_tolerance();
    if tolerance <= 0.0 {
        return;
    }
    let mut num_removed = 0usize;
    for constraint in &mut model.constraints {
        let before = constraint.num_terms();
        let mut kept_index = Vec::with_capacity(before);
        let mut kept_coefficient = Vec::with_capacity(before);
        for (&var, &coefficient) in constraint.var_index.iter().zip(&constraint.coefficient) {
            if coefficient.abs() >= tolerance {
                kept_index.push(var);
                kept_coefficient.push(coefficient);
            }
        }
        num_removed += before - kept_index.len();
        constraint.var_index = kept_index;
        constraint.coefficient = kept_coefficient;
    }
    for variable in &mut model.variables {
        if variable.objective_coefficient != 0.0
            && variable.objective_coefficient.abs() < tolerance
        {
            variable.objective_coefficient = 0.0;
            num_removed += 1;
        }
    }
    if num_removed > 0 {
        logger.log(&format!("Removed {num_removed} near-zero terms"));
    }
}

/// Substitute `x := x' / factor` throughout the model: bounds grow by the
/// factor, every coefficient of the variable shrinks by it.
fn apply_variable_factor(model: &mut MpModel, var: usize, factor: f64) {
    let variable = &mut model.variables[var];
    variable.lower_bound *= factor;
    variable.upper_bound *= factor;
    variable.objective_coefficient /= factor;
    for constraint in &mut model.constraints {
        for (position, &v) in constraint.var_index.iter().enumerate() {
            if v == var {
                constraint.coefficient[position] /= factor;
            }
        }
    }
}

fn is_integral(value: f64, tolerance: f64) -> bool {
    (value - value.round()).abs() <= tolerance
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
