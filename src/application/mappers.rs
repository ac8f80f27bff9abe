// Mappers: convert the scaled mixed-integer model into the engine's
// integer-only form, and project the caller's hint into engine space.
// Index correspondence is 1:1 at every point; nothing here reorders or
// drops variables.

use crate::domain::cp_model::{
    CpLinearConstraint, CpModel, CpObjective, CpSolutionHint, CpVariable,
};
use crate::domain::models::{MpModel, SolutionHint};
use crate::domain::params::SatParams;
use crate::infrastructure::logging::SolverLogger;

/// Largest integer magnitude we allow in the converted model; keeps every
/// value exactly representable in an i64 and an f64.
const MAX_INTEGER_MAGNITUDE: f64 = 9.0e15;

/// Multipliers tried when lifting fractional coefficients to integers.
const MULTIPLIER_LIMIT: f64 = 1e6;

/// Build the integer-only model from the presolved, scaled input.
///
/// Fails with a human-readable message when some coefficient pattern
/// cannot be represented; the pipeline turns that into a model-invalid
/// response, never a crash.
pub fn convert_model(
    params: &SatParams,
    model: &MpModel,
    logger: &SolverLogger,
) -> Result<CpModel, String> {
    let precision = params.mip_wanted_precision();
    let max_bound = params.mip_max_bound();

    let mut cp_model = CpModel::default();

    for (index, variable) in model.variables.iter().enumerate() {
        let lower = clamp_infinite(variable.lower_bound, max_bound);
        let upper = clamp_infinite(variable.upper_bound, max_bound);
        if lower.abs() > MAX_INTEGER_MAGNITUDE || upper.abs() > MAX_INTEGER_MAGNITUDE {
            return Err(format!(
                "domain of variable '{}' is too large for the integer model",
                display_name(&variable.name, index)
            ));
        }
        // Continuous variables land on the integer grid here; integer
        // variables already have integral bounds from the scaling stage.
        let lower = (lower - precision).ceil() as i64;
        let upper = (upper + precision).floor() as i64;
        if lower > upper {
            return Err(format!(
                "variable '{}' has no representable value on the integer grid",
                display_name(&variable.name, index)
            ));
        }
        cp_model.variables.push(CpVariable {
            lower_bound: lower,
            upper_bound: upper,
            name: variable.name.clone(),
        });
    }

    for (index, constraint) in model.constraints.iter().enumerate() {
        let multiplier =
            integer_multiplier(&constraint.coefficient, precision).ok_or_else(|| {
                format!(
                    "coefficients of constraint '{}' are not representable as integers",
                    display_name(&constraint.name, index)
                )
            })?;
        let coefficient: Vec<i64> = constraint
            .coefficient
            .iter()
            .map(|&c| (c * multiplier).round() as i64)
            .collect();

        // An infinite side collapses to the largest activity the terms can
        // reach, which keeps the constraint equivalent and bounded.
        let activity_bound = coefficient
            .iter()
            .zip(&constraint.var_index)
            .map(|(&c, &v)| {
                let var = &cp_model.variables[v];
                c.unsigned_abs() as f64 * var.lower_bound.abs().max(var.upper_bound.abs()) as f64
            })
            .sum::<f64>()
            .min(MAX_INTEGER_MAGNITUDE);
        let lower = if constraint.lower_bound.is_finite() {
            (constraint.lower_bound * multiplier - precision).ceil()
        } else {
            -activity_bound
        };
        let upper = if constraint.upper_bound.is_finite() {
            (constraint.upper_bound * multiplier + precision).floor()
        } else {
            activity_bound
        };
        if lower.abs() > MAX_INTEGER_MAGNITUDE || upper.abs() > MAX_INTEGER_MAGNITUDE {
            return Err(format!(
                "bounds of constraint '{}' are too large for the integer model",
                display_name(&constraint.name, index)
            ));
        }
        cp_model.constraints.push(CpLinearConstraint {
            var_index: constraint.var_index.clone(),
            coefficient,
            lower_bound: lower as i64,
            upper_bound: upper as i64,
        });
    }

    cp_model.objective = convert_objective(model, precision)?;

    logger.log(&format!(
        "Converted model: {} variables, {} constraints",
        cp_model.num_variables(),
        cp_model.constraints.len()
    ));
    Ok(cp_model)
}

fn convert_objective(model: &MpModel, precision: f64) -> Result<CpObjective, String> {
    let mut var_index = Vec::new();
    let mut raw_coefficients = Vec::new();
    for (index, variable) in model.variables.iter().enumerate() {
        if variable.objective_coefficient != 0.0 {
            var_index.push(index);
            raw_coefficients.push(variable.objective_coefficient);
        }
    }
    let multiplier = integer_multiplier(&raw_coefficients, precision)
        .ok_or_else(|| "objective coefficients are not representable as integers".to_string())?;

    // The engine always minimizes; a negative scaling factor encodes
    // maximization and maps the engine sum back to caller units.
    let sign = if model.maximize { -1.0 } else { 1.0 };
    let coefficient: Vec<i64> = raw_coefficients
        .iter()
        .map(|&c| (c * multiplier * sign).round() as i64)
        .collect();
    Ok(CpObjective {
        var_index,
        coefficient,
        offset: model.objective_offset,
        scaling_factor: sign / multiplier,
    })
}

/// Smallest power of ten (up to a limit) that lifts every value to an
/// integer within `tolerance`, or `None` when the pattern is not
/// representable.
fn integer_multiplier(values: &[f64], tolerance: f64) -> Option<f64> {
    let mut multiplier = 1.0;
    while multiplier <= MULTIPLIER_LIMIT {
        let fits = values.iter().all(|&value| {
            let scaled = value * multiplier;
            scaled.abs() <= MAX_INTEGER_MAGNITUDE && (scaled - scaled.round()).abs() <= tolerance
        });
        if fits {
            return Some(multiplier);
        }
        multiplier *= 10.0;
    }
    None
}

fn clamp_infinite(bound: f64, max_bound: f64) -> f64 {
    if bound == f64::INFINITY {
        max_bound
    } else if bound == f64::NEG_INFINITY {
        -max_bound
    } else {
        bound
    }
}

fn display_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("#{index}")
    } else {
        name.to_string()
    }
}

/// Map the caller's sparse hint into scaled engine space.
///
/// Indices beyond the current variable count are dropped silently (hints
/// may reference variables that no longer exist); values are scaled,
/// clamped to `±max_bound`, then rounded. Lossy on purpose: a hint seeds
/// the search, it never constrains it.
pub fn project_hint(hint: &SolutionHint, var_scaling: &[f64], max_bound: f64) -> CpSolutionHint {
    let mut projected = CpSolutionHint::default();
    for (&var, &value) in hint.var_index.iter().zip(&hint.var_value) {
        if var >= var_scaling.len() {
            continue;
        }
        let mut scaled = value * var_scaling[var];
        if scaled.abs() > max_bound {
            scaled = if scaled > 0.0 { max_bound } else { -max_bound };
        }
        projected.var_index.push(var);
        projected.values.push(scaled.round() as i64);
    }
    projected
}
