//! The estimator seam: design-matrix input and fit-summary output.

use std::collections::BTreeMap;

/// A prepared regression design: dependent vector, named regressor columns,
/// and the entity/time structure the estimator may absorb as fixed effects.
#[derive(Debug, Clone)]
pub struct RegressionInput {
    /// Dependent variable, one entry per observation
    pub dependent: Vec<f64>,
    /// Regressor names, in column order
    pub regressors: Vec<String>,
    /// One column per regressor, each the length of `dependent`
    pub columns: Vec<Vec<f64>>,
    /// Entity index per observation (0..n_entities)
    pub entity: Vec<usize>,
    /// Calendar year per observation
    pub year: Vec<i32>,
    pub n_entities: usize,
}

impl RegressionInput {
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.dependent.len()
    }
}

/// Coefficients, standard errors, and p-values keyed by regressor name
#[derive(Debug, Clone, Default)]
pub struct FitSummary {
    pub nobs: usize,
    pub params: BTreeMap<String, f64>,
    pub std_errors: BTreeMap<String, f64>,
    pub pvalues: BTreeMap<String, f64>,
}

impl FitSummary {
    /// Coefficient for a named regressor; NaN when absent, matching the
    /// lenient lookup the result tables expect
    #[must_use]
    pub fn param(&self, name: &str) -> f64 {
        self.params.get(name).copied().unwrap_or(f64::NAN)
    }

    #[must_use]
    pub fn std_error(&self, name: &str) -> f64 {
        self.std_errors.get(name).copied().unwrap_or(f64::NAN)
    }

    #[must_use]
    pub fn pvalue(&self, name: &str) -> f64 {
        self.pvalues.get(name).copied().unwrap_or(f64::NAN)
    }
}

/// An external panel estimator. Failures (collinearity, singular designs)
/// surface as errors and are caught at the per-subgroup boundary, recorded,
/// and never allowed to stop the run.
pub trait Estimator {
    /// Short name used in logs and result metadata
    fn name(&self) -> &'static str;

    /// Fit the design and return the summary
    fn fit(&self, input: &RegressionInput) -> anyhow::Result<FitSummary>;
}
