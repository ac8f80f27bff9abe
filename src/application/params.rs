// Encoding and decoding of the opaque solver-parameter blob.
//
// The build flavor fixes the encoding once: the default flavor reads the
// prost binary wire format, the `text-params` flavor reads a JSON document.
// Both decode into the same `SatParams` type and merge over fields already
// set from the request.

use crate::domain::params::SatParams;

use super::SolveError;

/// Merge an encoded parameter blob over `params`.
///
/// Fields absent from the blob keep their current value; fields present in
/// the blob win. Fails with [`SolveError::InvalidParameters`] when the blob
/// does not decode in the encoding of the current build flavor.
#[cfg(not(feature = "text-params"))]
pub fn merge_from_blob(params: &mut SatParams, blob: &[u8]) -> Result<(), SolveError> {
    use prost::Message;

    params.merge(blob).map_err(|_| {
        SolveError::InvalidParameters(
            "solver_parameters is not a valid binary stream of the SatParams message".to_string(),
        )
    })
}

/// Merge an encoded parameter blob over `params`.
///
/// Fields absent from the blob keep their current value; fields present in
/// the blob win. Fails with [`SolveError::InvalidParameters`] when the blob
/// does not decode in the encoding of the current build flavor.
#[cfg(feature = "text-params")]
pub fn merge_from_blob(params: &mut SatParams, blob: &[u8]) -> Result<(), SolveError> {
    let parsed: SatParams = serde_json::from_slice(blob).map_err(|_| {
        SolveError::InvalidParameters(
            "solver_parameters is not a valid textual representation of the SatParams message"
                .to_string(),
        )
    })?;
    overlay(params, parsed);
    Ok(())
}

#[cfg(feature = "text-params")]
fn overlay(target: &mut SatParams, source: SatParams) {
    if source.log_search_progress.is_some() {
        target.log_search_progress = source.log_search_progress;
    }
    if source.log_to_stdout.is_some() {
        target.log_to_stdout = source.log_to_stdout;
    }
    if source.max_time_in_seconds.is_some() {
        target.max_time_in_seconds = source.max_time_in_seconds;
    }
    if source.enumerate_all_solutions.is_some() {
        target.enumerate_all_solutions = source.enumerate_all_solutions;
    }
    if source.mip_presolve_level.is_some() {
        target.mip_presolve_level = source.mip_presolve_level;
    }
    if source.mip_max_bound.is_some() {
        target.mip_max_bound = source.mip_max_bound;
    }
    if source.mip_var_scaling.is_some() {
        target.mip_var_scaling = source.mip_var_scaling;
    }
    if source.mip_automatically_scale_variables.is_some() {
        target.mip_automatically_scale_variables = source.mip_automatically_scale_variables;
    }
    if source.mip_scale_large_domain.is_some() {
        target.mip_scale_large_domain = source.mip_scale_large_domain;
    }
    if source.mip_drop_tolerance.is_some() {
        target.mip_drop_tolerance = source.mip_drop_tolerance;
    }
    if source.mip_wanted_precision.is_some() {
        target.mip_wanted_precision = source.mip_wanted_precision;
    }
    if source.only_solve_ip.is_some() {
        target.only_solve_ip = source.only_solve_ip;
    }
}

/// Encode parameters in the blob format of the current build flavor, the
/// exact inverse of [`merge_from_blob`] applied to default parameters.
#[cfg(not(feature = "text-params"))]
pub fn encode_sat_parameters(params: &SatParams) -> Vec<u8> {
    use prost::Message;

    params.encode_to_vec()
}

/// Encode parameters in the blob format of the current build flavor, the
/// exact inverse of [`merge_from_blob`] applied to default parameters.
#[cfg(feature = "text-params")]
pub fn encode_sat_parameters(params: &SatParams) -> Vec<u8> {
    // Serializing a plain field struct cannot fail; a failure here is a
    // pipeline bug.
    serde_json::to_vec(params).expect("SatParams serializes infallibly")
}
