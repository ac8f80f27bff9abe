// Engine parameters shared by the pipeline and the back-end.
//
// The struct doubles as the wire type of the solver-specific parameter
// blob: a prost message in the default build flavor, a serde document when
// the `text-params` feature selects the textual flavor. All fields carry
// explicit presence so a decoded blob can be merged over request-level
// settings without clobbering them.

/// Structured solver configuration.
///
/// Unset fields fall back to the defaults documented on the accessor
/// methods; always read through the accessors.
#[derive(Clone, PartialEq, ::prost::Message)]
#[cfg_attr(feature = "text-params", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "text-params", serde(default))]
pub struct SatParams {
    /// Default: false
    #[prost(bool, optional, tag = "1", default = "false")]
    pub log_search_progress: Option<bool>,
    /// Default: true
    #[prost(bool, optional, tag = "2", default = "true")]
    pub log_to_stdout: Option<bool>,
    /// Default: no limit
    #[prost(double, optional, tag = "3", default = "inf")]
    pub max_time_in_seconds: Option<f64>,
    /// Default: false
    #[prost(bool, optional, tag = "4", default = "false")]
    pub enumerate_all_solutions: Option<bool>,
    /// Default: 2. Zero disables the reversible simplification steps.
    #[prost(int32, optional, tag = "5", default = "2")]
    pub mip_presolve_level: Option<i32>,
    /// Default: 1e7. Largest magnitude any scaled variable bound, hint
    /// value or coefficient is allowed to reach.
    #[prost(double, optional, tag = "6", default = "1e7")]
    pub mip_max_bound: Option<f64>,
    /// Default: 1.0 (no uniform scaling of continuous variables)
    #[prost(double, optional, tag = "7", default = "1.0")]
    pub mip_var_scaling: Option<f64>,
    /// Default: true
    #[prost(bool, optional, tag = "8", default = "true")]
    pub mip_automatically_scale_variables: Option<bool>,
    /// Default: false. When set, uniform scaling ignores `mip_max_bound`
    /// and lets scaled domains grow without a cap.
    #[prost(bool, optional, tag = "9", default = "false")]
    pub mip_scale_large_domain: Option<bool>,
    /// Default: 1e-16
    #[prost(double, optional, tag = "10", default = "1e-16")]
    pub mip_drop_tolerance: Option<f64>,
    /// Default: 1e-6
    #[prost(double, optional, tag = "11", default = "1e-6")]
    pub mip_wanted_precision: Option<f64>,
    /// Default: false
    #[prost(bool, optional, tag = "12", default = "false")]
    pub only_solve_ip: Option<bool>,
}

impl SatParams {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Check every parameter against its allowed range.
///
/// Returns an empty string when all values are valid, otherwise a message
/// naming the first violated field.
pub fn validate_params(params: &SatParams) -> String {
    let max_bound = params.mip_max_bound();
    if !max_bound.is_finite() || max_bound < 0.0 {
        return format!(
            "parameter 'mip_max_bound' must be finite and non-negative, got {max_bound}"
        );
    }
    let var_scaling = params.mip_var_scaling();
    if !var_scaling.is_finite() || var_scaling <= 0.0 {
        return format!(
            "parameter 'mip_var_scaling' must be finite and positive, got {var_scaling}"
        );
    }
    let time_limit = params.max_time_in_seconds();
    if time_limit.is_nan() || time_limit < 0.0 {
        return format!(
            "parameter 'max_time_in_seconds' must be non-negative, got {time_limit}"
        );
    }
    let presolve_level = params.mip_presolve_level();
    if !(0..=3).contains(&presolve_level) {
        return format!(
            "parameter 'mip_presolve_level' must be in [0, 3], got {presolve_level}"
        );
    }
    let precision = params.mip_wanted_precision();
    if !(precision > 0.0 && precision < 1.0) {
        return format!(
            "parameter 'mip_wanted_precision' must be in (0, 1), got {precision}"
        );
    }
    let drop_tolerance = params.mip_drop_tolerance();
    if !(drop_tolerance >= 0.0) {
        return format!(
            "parameter 'mip_drop_tolerance' must be non-negative, got {drop_tolerance}"
        );
    }
    String::new()
}
