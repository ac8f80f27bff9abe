// End-to-end pipeline tests against a scripted engine back-end.
//
// The engine stub records what it was handed and replays a canned
// response, so each test can check both directions of the bridge: the
// integer model the engine receives and the original-space response the
// caller gets back.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use satbridge::application::params::encode_sat_parameters;
use satbridge::{
    CpEngine, CpModel, EngineResponse, EngineSolution, MpConstraint, MpModel, MpSolution,
    MpVariable, ResponseStatus, SatParams, SatPipeline, SolutionHint, SolveHooks, SolveRequest,
    SolveSession,
};

/// Snapshot of one engine invocation
#[derive(Debug, Clone)]
struct SeenCall {
    model: CpModel,
    interrupt_registered: bool,
    max_time_in_seconds: f64,
    log_search_progress: bool,
}

/// Engine stub: records the call, streams scripted intermediate
/// solutions, then returns a scripted response.
struct ScriptedEngine {
    response: EngineResponse,
    stream: Vec<EngineSolution>,
    seen: Arc<Mutex<Option<SeenCall>>>,
}

impl ScriptedEngine {
    fn returning(response: EngineResponse) -> (Self, Arc<Mutex<Option<SeenCall>>>) {
        let seen = Arc::new(Mutex::new(None));
        let engine = Self {
            response,
            stream: Vec::new(),
            seen: Arc::clone(&seen),
        };
        (engine, seen)
    }

    fn with_stream(mut self, stream: Vec<EngineSolution>) -> Self {
        self.stream = stream;
        self
    }
}

impl CpEngine for ScriptedEngine {
    fn solve(
        &self,
        model: &CpModel,
        params: &SatParams,
        session: &mut SolveSession<'_>,
    ) -> EngineResponse {
        *self.seen.lock().unwrap() = Some(SeenCall {
            model: model.clone(),
            interrupt_registered: session.interrupt.is_some(),
            max_time_in_seconds: params.max_time_in_seconds(),
            log_search_progress: params.log_search_progress(),
        });
        for solution in &self.stream {
            session.report_solution(solution);
        }
        self.response.clone()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn optimal_response(objective_value: f64, solution: Vec<i64>) -> EngineResponse {
    EngineResponse {
        status: 4,
        objective_value,
        best_objective_bound: objective_value,
        solution,
        ..EngineResponse::default()
    }
}

fn seen(slot: &Arc<Mutex<Option<SeenCall>>>) -> SeenCall {
    slot.lock().unwrap().clone().expect("engine was not called")
}

#[test]
fn mixed_model_round_trips_through_the_engine() {
    // min 3x + y with x integer in [0, 10], y continuous in [0.5, 2.5],
    // x + y <= 6.
    let model = MpModel::new()
        .add_variable(MpVariable::integer("x").with_bounds(0.0, 10.0).with_objective(3.0))
        .add_variable(MpVariable::continuous("y").with_bounds(0.5, 2.5).with_objective(1.0))
        .add_constraint(MpConstraint::new(
            vec![0, 1],
            vec![1.0, 1.0],
            f64::NEG_INFINITY,
            6.0,
        ));

    let (engine, seen_slot) = ScriptedEngine::returning(optimal_response(5.0, vec![1, 2]));
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(SolveRequest::new(model), SolveHooks::new())
        .unwrap();

    let call = seen(&seen_slot);
    // The engine model is fully integral: x keeps its bounds, y lands on
    // the integer grid inside [0.5, 2.5].
    assert_eq!(call.model.variables[0].lower_bound, 0);
    assert_eq!(call.model.variables[0].upper_bound, 10);
    assert_eq!(call.model.variables[1].lower_bound, 1);
    assert_eq!(call.model.variables[1].upper_bound, 2);
    assert_eq!(call.model.constraints[0].coefficient, vec![1, 1]);
    assert_eq!(call.model.constraints[0].upper_bound, 6);
    assert_eq!(call.model.objective.var_index, vec![0, 1]);
    assert_eq!(call.model.objective.coefficient, vec![3, 1]);

    assert_eq!(response.status, ResponseStatus::Optimal);
    assert_eq!(response.objective_value, Some(5.0));
    assert_eq!(response.best_objective_bound, Some(5.0));
    assert_eq!(response.variable_values, vec![1.0, 2.0]);
}

#[test]
fn maximization_reaches_the_engine_as_negated_minimization() {
    // max 2x + 1 with x integer in [0, 10].
    let model = MpModel::new()
        .maximize()
        .with_offset(1.0)
        .add_variable(MpVariable::integer("x").with_bounds(0.0, 10.0).with_objective(2.0));

    let (engine, seen_slot) = ScriptedEngine::returning(optimal_response(21.0, vec![10]));
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(SolveRequest::new(model), SolveHooks::new())
        .unwrap();

    let call = seen(&seen_slot);
    assert_eq!(call.model.objective.coefficient, vec![-2]);
    assert_eq!(call.model.objective.scaling_factor, -1.0);
    assert_eq!(call.model.objective.offset, 1.0);
    // The declared contract maps the engine sum back to caller units.
    assert_eq!(call.model.objective_value_of(&[10]), 21.0);

    assert_eq!(response.objective_value, Some(21.0));
    assert_eq!(response.variable_values, vec![10.0]);
}

#[test]
fn continuous_scaling_is_applied_and_undone() {
    let model = MpModel::new()
        .add_variable(MpVariable::continuous("y").with_bounds(0.0, 5.0))
        .with_hint(SolutionHint {
            var_index: vec![0, 9],
            var_value: vec![2.0, 1.0],
        });
    let blob = encode_sat_parameters(&SatParams {
        mip_var_scaling: Some(100.0),
        ..SatParams::new()
    });

    let (engine, seen_slot) = ScriptedEngine::returning(optimal_response(0.0, vec![250]));
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(
            SolveRequest::new(model).with_solver_parameters(blob),
            SolveHooks::new(),
        )
        .unwrap();

    let call = seen(&seen_slot);
    // Domain scaled by 100; the hint is scaled the same way and the entry
    // referencing a variable that does not exist is dropped.
    assert_eq!(call.model.variables[0].upper_bound, 500);
    let hint = call.model.solution_hint.expect("hint should be projected");
    assert_eq!(hint.var_index, vec![0]);
    assert_eq!(hint.values, vec![200]);

    // The engine-space value divides back into the original domain.
    assert_eq!(response.variable_values, vec![2.5]);
}

#[test]
fn additional_solutions_are_deduplicated_recomputed_and_sorted() {
    // max x with x integer in [0, 10].
    let model = MpModel::new()
        .maximize()
        .add_variable(MpVariable::integer("x").with_bounds(0.0, 10.0).with_objective(1.0));

    let response = EngineResponse {
        status: 4,
        objective_value: 3.0,
        best_objective_bound: 10.0,
        solution: vec![3],
        additional_solutions: vec![vec![3], vec![1], vec![5]],
        ..EngineResponse::default()
    };
    let (engine, _) = ScriptedEngine::returning(response);
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(SolveRequest::new(model), SolveHooks::new())
        .unwrap();

    // The duplicate of the primary solution is gone, objectives are
    // recomputed from the model, and maximization sorts best-first.
    assert_eq!(
        response.additional_solutions,
        vec![
            MpSolution {
                objective_value: 5.0,
                variable_values: vec![5.0],
            },
            MpSolution {
                objective_value: 1.0,
                variable_values: vec![1.0],
            },
        ]
    );
}

#[test]
fn minimization_sorts_additional_solutions_ascending() {
    let model = MpModel::new()
        .add_variable(MpVariable::integer("x").with_bounds(0.0, 10.0).with_objective(1.0));

    let response = EngineResponse {
        status: 4,
        objective_value: 1.0,
        best_objective_bound: 1.0,
        solution: vec![1],
        additional_solutions: vec![vec![7], vec![2]],
        ..EngineResponse::default()
    };
    let (engine, _) = ScriptedEngine::returning(response);
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(SolveRequest::new(model), SolveHooks::new())
        .unwrap();

    let objectives: Vec<f64> = response
        .additional_solutions
        .iter()
        .map(|s| s.objective_value)
        .collect();
    assert_eq!(objectives, vec![2.0, 7.0]);
}

#[test]
fn streamed_solutions_are_reported_in_original_space() {
    // A fixed variable is substituted by presolve; streamed solutions must
    // still come back with it reinstated.
    let model = MpModel::new()
        .add_variable(MpVariable::continuous("z").with_bounds(7.0, 7.0))
        .add_variable(MpVariable::integer("x").with_bounds(0.0, 10.0).with_objective(1.0))
        .add_constraint(MpConstraint::new(vec![0, 1], vec![1.0, 1.0], 0.0, 20.0));

    let (engine, _) = ScriptedEngine::returning(optimal_response(2.0, vec![7, 2]));
    let engine = engine.with_stream(vec![
        EngineSolution {
            objective_value: 5.0,
            values: vec![0, 5],
        },
        EngineSolution {
            objective_value: 2.0,
            values: vec![0, 2],
        },
    ]);
    let pipeline = SatPipeline::new(engine);

    let streamed: Arc<Mutex<Vec<MpSolution>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&streamed);
    let mut callback = move |solution: MpSolution| sink.lock().unwrap().push(solution);
    let hooks = SolveHooks {
        interrupt: None,
        logging_callback: None,
        solution_callback: Some(&mut callback),
    };
    pipeline.solve(SolveRequest::new(model), hooks).unwrap();

    let streamed = streamed.lock().unwrap();
    assert_eq!(streamed.len(), 2);
    // The substituted variable carries its fixed value in every report.
    assert_eq!(streamed[0].variable_values, vec![7.0, 5.0]);
    assert_eq!(streamed[0].objective_value, 5.0);
    assert_eq!(streamed[1].variable_values, vec![7.0, 2.0]);
}

#[test]
fn interrupt_flag_is_handed_to_the_engine() {
    let model = MpModel::new().add_variable(MpVariable::integer("x").with_bounds(0.0, 1.0));
    let (engine, seen_slot) = ScriptedEngine::returning(optimal_response(0.0, vec![0]));
    let pipeline = SatPipeline::new(engine);

    let interrupt = AtomicBool::new(false);
    let hooks = SolveHooks {
        interrupt: Some(&interrupt),
        logging_callback: None,
        solution_callback: None,
    };
    pipeline.solve(SolveRequest::new(model), hooks).unwrap();

    assert!(seen(&seen_slot).interrupt_registered);
}

#[test]
fn request_time_limit_lands_in_the_parameters() {
    let model = MpModel::new().add_variable(MpVariable::integer("x").with_bounds(0.0, 1.0));
    let (engine, seen_slot) = ScriptedEngine::returning(optimal_response(0.0, vec![0]));
    let pipeline = SatPipeline::new(engine);

    pipeline
        .solve(
            SolveRequest::new(model).with_time_limit(30.0),
            SolveHooks::new(),
        )
        .unwrap();

    assert_eq!(seen(&seen_slot).max_time_in_seconds, 30.0);
}

#[test]
fn parameter_blob_overrides_the_request_logging_flag() {
    let model = MpModel::new().add_variable(MpVariable::integer("x").with_bounds(0.0, 1.0));
    let blob = encode_sat_parameters(&SatParams {
        log_search_progress: Some(true),
        log_to_stdout: Some(false),
        ..SatParams::new()
    });

    let (engine, seen_slot) = ScriptedEngine::returning(optimal_response(0.0, vec![0]));
    let pipeline = SatPipeline::new(engine);
    pipeline
        .solve(
            SolveRequest::new(model)
                .with_solver_parameters(blob)
                .with_internal_solver_output(false),
            SolveHooks::new(),
        )
        .unwrap();

    assert!(seen(&seen_slot).log_search_progress);
}

#[test]
fn unrecognized_engine_status_becomes_abnormal() {
    let model = MpModel::new().add_variable(MpVariable::integer("x").with_bounds(0.0, 1.0));
    let response = EngineResponse {
        status: 99,
        objective_value: 123.0,
        solution: vec![1],
        ..EngineResponse::default()
    };
    let (engine, _) = ScriptedEngine::returning(response);
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(SolveRequest::new(model), SolveHooks::new())
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Abnormal);
    // No guarantee means no solution fields.
    assert_eq!(response.objective_value, None);
    assert!(response.variable_values.is_empty());
}

#[test]
fn engine_times_are_copied_onto_the_response() {
    let model = MpModel::new().add_variable(MpVariable::integer("x").with_bounds(0.0, 1.0));
    let response = EngineResponse {
        status: 4,
        solution: vec![0],
        wall_time_seconds: 1.25,
        user_time_seconds: 0.75,
        ..EngineResponse::default()
    };
    let (engine, _) = ScriptedEngine::returning(response);
    let pipeline = SatPipeline::new(engine);
    let response = pipeline
        .solve(SolveRequest::new(model), SolveHooks::new())
        .unwrap();

    assert_eq!(response.solve_info.solve_wall_time_seconds, 1.25);
    assert_eq!(response.solve_info.solve_user_time_seconds, 0.75);
}
