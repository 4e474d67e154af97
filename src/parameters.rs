//! # Analysis parameters
//!
//! Thresholds steering quantisation and statistical disclosure control.
//!
//! The parameters are a plain value passed explicitly into every stage entry
//! point; no stage reads ambient or global configuration. Defaults match the
//! methodology document (ψ = 0.3, φ = 0.5, ξ = 1).

use crate::constants::{
    DEFAULT_DAY_QUANTISATION_THRESHOLD, DEFAULT_SDC_THRESHOLD,
    DEFAULT_SUB_PERIOD_QUANTISATION_THRESHOLD,
};

/// Thresholds of the footprint analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    /// Whole-period quantisation threshold (ψ). A user/tile row whose
    /// whole-period value is below it is dropped entirely.
    pub day_quantisation_threshold: f64,
    /// Sub-period quantisation threshold (φ), applied to the ratio
    /// `values[i] / values[0]` of a surviving row.
    pub sub_period_quantisation_threshold: f64,
    /// Statistical-disclosure-control threshold (ξ). Published counts below
    /// it are suppressed; suppression is never bypassable below this value.
    pub sdc_threshold: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            day_quantisation_threshold: DEFAULT_DAY_QUANTISATION_THRESHOLD,
            sub_period_quantisation_threshold: DEFAULT_SUB_PERIOD_QUANTISATION_THRESHOLD,
            sdc_threshold: DEFAULT_SDC_THRESHOLD,
        }
    }
}

impl AnalysisParams {
    /// Construct a new [`AnalysisParams`] with the default thresholds.
    ///
    /// This is equivalent to calling [`AnalysisParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`AnalysisParamsBuilder`] to override individual
    /// thresholds step by step.
    ///
    /// # Example
    ///
    /// ```rust
    /// use urbanfp::parameters::AnalysisParams;
    ///
    /// let params = AnalysisParams::builder()
    ///     .day_quantisation_threshold(0.5)
    ///     .sdc_threshold(20.0)
    ///     .build();
    /// assert_eq!(params.sub_period_quantisation_threshold, 0.5);
    /// ```
    pub fn builder() -> AnalysisParamsBuilder {
        AnalysisParamsBuilder::new()
    }
}

/// Fluent builder for [`AnalysisParams`].
#[derive(Debug, Clone)]
pub struct AnalysisParamsBuilder {
    params: AnalysisParams,
}

impl Default for AnalysisParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisParamsBuilder {
    /// Create a new builder initialized with the default thresholds.
    pub fn new() -> Self {
        Self {
            params: AnalysisParams::default(),
        }
    }

    /// Set the whole-period quantisation threshold (ψ).
    pub fn day_quantisation_threshold(mut self, value: f64) -> Self {
        self.params.day_quantisation_threshold = value;
        self
    }

    /// Set the sub-period quantisation threshold (φ).
    pub fn sub_period_quantisation_threshold(mut self, value: f64) -> Self {
        self.params.sub_period_quantisation_threshold = value;
        self
    }

    /// Set the statistical-disclosure-control threshold (ξ).
    pub fn sdc_threshold(mut self, value: f64) -> Self {
        self.params.sdc_threshold = value;
        self
    }

    /// Finalize the builder.
    pub fn build(self) -> AnalysisParams {
        self.params
    }
}
