// The solve pipeline: request -> parameters -> validation -> presolve ->
// scaling -> conversion -> engine -> postsolve -> response.
//
// Every early exit is classified into a response status and, when logging
// is enabled, echoed as the same formatted status line a full engine run
// would produce. Only configuration problems travel the error channel.

use std::cmp::Ordering;
use std::sync::atomic::AtomicBool;

use crate::domain::engine::{CpEngine, EngineSolution, SolveSession};
use crate::domain::models::{MpModel, MpSolution, SolveRequest, SolveResponse};
use crate::domain::params::validate_params;
use crate::domain::value_objects::{CpSolverStatus, ResponseStatus};
use crate::infrastructure::logging::SolverLogger;

use super::mappers::{convert_model, project_hint};
use super::params::merge_from_blob;
use super::postsolve::postsolve_solution;
use super::presolve::{apply_presolve_steps, PresolveOutcome, PresolveStack};
use super::scaling::{
    detect_implied_integers, integerize_bounds, remove_near_zero_terms, scale_continuous_variables,
};
use super::SolveError;

/// Magnitude above which a finite input number is considered malformed.
const MAX_FINITE_MAGNITUDE: f64 = 1e25;

/// Per-call hooks supplied by the caller.
///
/// The interrupt flag is registered with the engine, never polled here.
/// Both callbacks run synchronously: the logging callback from whichever
/// context emits the line, the solution callback on the engine's own call
/// stack for every improving solution. Neither may re-enter the pipeline.
pub struct SolveHooks<'a> {
    pub interrupt: Option<&'a AtomicBool>,
    pub logging_callback: Option<Box<dyn Fn(&str) + Send>>,
    pub solution_callback: Option<&'a mut (dyn FnMut(MpSolution) + 'a)>,
}

impl<'a> SolveHooks<'a> {
    pub fn new() -> Self {
        Self {
            interrupt: None,
            logging_callback: None,
            solution_callback: None,
        }
    }
}

impl<'a> Default for SolveHooks<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts mixed-integer solve requests onto an integer-only engine
pub struct SatPipeline<E> {
    engine: E,
}

impl<E: CpEngine> SatPipeline<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Run one request end to end.
    ///
    /// Consumes the request: the model is destroyed as soon as the integer
    /// model exists, bounding peak memory. Returns `Err` only for
    /// configuration problems; every model-related outcome is a response.
    pub fn solve(
        &self,
        mut request: SolveRequest,
        mut hooks: SolveHooks<'_>,
    ) -> Result<SolveResponse, SolveError> {
        let mut params = crate::domain::params::SatParams::new();
        // Set now so the solver-specific blob can override it.
        params.log_search_progress = Some(request.enable_internal_solver_output);
        if let Some(blob) = request.solver_parameters.take() {
            merge_from_blob(&mut params, &blob)?;
        }
        if let Some(limit) = request.time_limit_seconds {
            params.max_time_in_seconds = Some(limit);
        }

        let mut logger = SolverLogger::new();
        if let Some(callback) = hooks.logging_callback.take() {
            logger.add_info_logging_callback(callback);
        }
        logger.enable_logging(params.log_search_progress());
        logger.set_log_to_stdout(params.log_to_stdout());

        // Structural validation; also closes trivial models, so the early
        // status here is not always MODEL_INVALID.
        if let Some(response) = validate_model(&request.model) {
            logger.log_status_summary(CpSolverStatus::from_response_status(response.status));
            return Ok(response);
        }

        if let Err(detail) = pre_conversion_checks(&request.model) {
            return Ok(model_invalid_response(
                &logger,
                format!("Extra integer-conversion validation failed: {detail}"),
            ));
        }

        let range_error = validate_params(&params);
        if !range_error.is_empty() {
            return Err(SolveError::InvalidParameters(range_error));
        }

        let model = &mut request.model;
        if let Err(empty) = integerize_bounds(&params, model, &logger) {
            return Ok(infeasible_response(
                &logger,
                format!("An integer variable has an empty domain: '{}'", empty.variable),
            ));
        }

        // Tiny coefficients cause trouble twice: once for presolve, once
        // for the implied-integer detection below.
        remove_near_zero_terms(&params, model, &logger);

        let mut stack = PresolveStack::new();
        if !params.enumerate_all_solutions() && params.mip_presolve_level() > 0 {
            let (applied, outcome) = apply_presolve_steps(model, &logger);
            match outcome {
                PresolveOutcome::Continue => stack = applied,
                PresolveOutcome::ProvenInfeasible => {
                    return Ok(infeasible_response(
                        &logger,
                        "Problem proven infeasible during MIP presolve".to_string(),
                    ));
                }
                PresolveOutcome::ProvenInvalid => {
                    return Ok(model_invalid_response(
                        &logger,
                        "Problem detected invalid during MIP presolve".to_string(),
                    ));
                }
                PresolveOutcome::InfeasibleOrUnbounded => {
                    logger.log("MIP presolve: problem infeasible or unbounded.");
                    logger.log_status_summary(CpSolverStatus::Unknown);
                    return Ok(SolveResponse::new(
                        ResponseStatus::Unknown,
                        "Problem proven infeasible or unbounded during MIP presolve",
                    ));
                }
            }
        }

        remove_near_zero_terms(&params, model, &logger);

        logger.log("");
        logger.log("Scaling to pure integer problem.");

        let mut var_scaling = vec![1.0; model.num_variables()];
        if params.mip_automatically_scale_variables() {
            var_scaling = detect_implied_integers(&params, model, &logger);
            if let Err(empty) = integerize_bounds(&params, model, &logger) {
                return Ok(infeasible_response(
                    &logger,
                    format!(
                        "A detected integer variable has an empty domain: '{}'",
                        empty.variable
                    ),
                ));
            }
        }
        if params.mip_var_scaling() != 1.0 {
            let max_bound = if params.mip_scale_large_domain() {
                f64::INFINITY
            } else {
                params.mip_max_bound()
            };
            let uniform = scale_continuous_variables(params.mip_var_scaling(), max_bound, model);
            // Combined by multiplication, never replacement.
            for (factor, extra) in var_scaling.iter_mut().zip(uniform) {
                *factor *= extra;
            }
        }
        debug_assert_eq!(var_scaling.len(), model.num_variables());

        // Refusing here is deliberate: relaxing the switch solves a more
        // constrained discretization, not an equivalent model.
        if params.only_solve_ip() && !model.is_fully_integer() {
            return Ok(model_invalid_response(
                &logger,
                "The model contains non-integer variables but the parameter 'only_solve_ip' \
                 was set. Change this parameter if you still want to solve a more constrained \
                 version of the original MIP where non-integer variables can only take a \
                 finite set of values."
                    .to_string(),
            ));
        }

        let mut cp_model = match convert_model(&params, model, &logger) {
            Ok(converted) => converted,
            Err(detail) => {
                return Ok(model_invalid_response(
                    &logger,
                    format!("Failed to convert model into integer model: {detail}"),
                ));
            }
        };
        debug_assert_eq!(cp_model.num_variables(), var_scaling.len());

        if let Some(hint) = model.solution_hint.take() {
            cp_model.solution_hint =
                Some(project_hint(&hint, &var_scaling, params.mip_max_bound()));
        }

        // Everything the solve needs now lives in the integer model; free
        // the request before the potentially long engine call.
        let maximize = model.maximize;
        drop(request);

        let post_solve = |values: &[i64], objective: f64| {
            postsolve_solution(values, objective, &var_scaling, &stack)
        };

        let mut session = SolveSession::new();
        session.interrupt = hooks.interrupt;
        let mut forward;
        let engine_response = match hooks.solution_callback {
            Some(callback) => {
                forward = |engine_solution: &EngineSolution| {
                    callback(post_solve(
                        &engine_solution.values,
                        engine_solution.objective_value,
                    ));
                };
                session.observer = Some(&mut forward);
                self.engine.solve(&cp_model, &params, &mut session)
            }
            None => self.engine.solve(&cp_model, &params, &mut session),
        };

        let mut response = SolveResponse::new(
            ResponseStatus::from_engine_code(engine_response.status),
            String::new(),
        );
        response.solve_info.solve_wall_time_seconds = engine_response.wall_time_seconds;
        response.solve_info.solve_user_time_seconds = engine_response.user_time_seconds;
        if response.status.has_solution() {
            response.objective_value = Some(engine_response.objective_value);
            response.best_objective_bound = Some(engine_response.best_objective_bound);
            response.variable_values = post_solve(
                &engine_response.solution,
                engine_response.objective_value,
            )
            .variable_values;
        }

        // Alternate solutions: drop exact duplicates of the primary,
        // recompute the objective from the model's own terms, then order
        // by objective in the optimization direction (stable, so ties keep
        // engine order).
        for additional in &engine_response.additional_solutions {
            if *additional == engine_response.solution {
                continue;
            }
            let objective = cp_model.objective_value_of(additional);
            response
                .additional_solutions
                .push(post_solve(additional, objective));
        }
        response.additional_solutions.sort_by(|left, right| {
            let ordering = left
                .objective_value
                .partial_cmp(&right.objective_value)
                .unwrap_or(Ordering::Equal);
            if maximize {
                ordering.reverse()
            } else {
                ordering
            }
        });

        Ok(response)
    }
}

fn infeasible_response(logger: &SolverLogger, message: String) -> SolveResponse {
    logger.log(&format!("Infeasible model detected in solve.\n{message}"));
    logger.log_status_summary(CpSolverStatus::Infeasible);
    SolveResponse::new(ResponseStatus::Infeasible, message)
}

fn model_invalid_response(logger: &SolverLogger, message: String) -> SolveResponse {
    logger.log(&format!("Invalid model in solve.\n{message}"));
    logger.log_status_summary(CpSolverStatus::ModelInvalid);
    SolveResponse::new(ResponseStatus::ModelInvalid, message)
}

/// Structural validation of the incoming model.
///
/// Returns an early response for malformed models and closes the trivial
/// empty model as optimal.
fn validate_model(model: &MpModel) -> Option<SolveResponse> {
    if model.num_variables() == 0 && model.num_constraints() == 0 {
        let mut response =
            SolveResponse::new(ResponseStatus::Optimal, "Trivial model: nothing to solve");
        response.objective_value = Some(model.objective_offset);
        response.best_objective_bound = Some(model.objective_offset);
        return Some(response);
    }
    for (index, variable) in model.variables.iter().enumerate() {
        if variable.lower_bound.is_nan() || variable.upper_bound.is_nan() {
            return Some(SolveResponse::new(
                ResponseStatus::ModelInvalid,
                format!("variable #{index} has a NaN bound"),
            ));
        }
    }
    for (index, constraint) in model.constraints.iter().enumerate() {
        if constraint.var_index.len() != constraint.coefficient.len() {
            return Some(SolveResponse::new(
                ResponseStatus::ModelInvalid,
                format!("constraint #{index} has mismatched index and coefficient lists"),
            ));
        }
        if let Some(&var) = constraint
            .var_index
            .iter()
            .find(|&&v| v >= model.num_variables())
        {
            return Some(SolveResponse::new(
                ResponseStatus::ModelInvalid,
                format!("constraint #{index} references unknown variable #{var}"),
            ));
        }
    }
    if let Some(hint) = &model.solution_hint {
        if hint.var_index.len() != hint.var_value.len() {
            return Some(SolveResponse::new(
                ResponseStatus::ModelInvalid,
                "solution hint has mismatched index and value lists".to_string(),
            ));
        }
    }
    None
}

/// Reject numeric garbage the integer conversion cannot survive.
fn pre_conversion_checks(model: &MpModel) -> Result<(), String> {
    for (index, variable) in model.variables.iter().enumerate() {
        let bad_bound = |b: f64| b.is_finite() && b.abs() > MAX_FINITE_MAGNITUDE;
        if bad_bound(variable.lower_bound) || bad_bound(variable.upper_bound) {
            return Err(format!("variable #{index} has an oversized bound"));
        }
        if !variable.objective_coefficient.is_finite() {
            return Err(format!(
                "variable #{index} has a non-finite objective coefficient"
            ));
        }
    }
    for (index, constraint) in model.constraints.iter().enumerate() {
        for &coefficient in &constraint.coefficient {
            if !coefficient.is_finite() || coefficient.abs() > MAX_FINITE_MAGNITUDE {
                return Err(format!(
                    "constraint #{index} has a non-finite or oversized coefficient"
                ));
            }
        }
    }
    Ok(())
}
