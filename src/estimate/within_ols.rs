//! Default estimator: two-way fixed effects by within-entity demeaning plus
//! year dummies, solved as ordinary least squares with entity-clustered
//! standard errors. A thin wrapper over a dense linear-algebra solve; the
//! interesting failure modes (singular designs, absorbed regressors) come
//! back as errors for the subgroup boundary to record.

use anyhow::{anyhow, bail};
use nalgebra::{DMatrix, DVector};

use crate::estimate::model::{Estimator, FitSummary, RegressionInput};
use crate::utils::stats;

/// Two-way fixed-effects OLS with clustered standard errors
#[derive(Debug, Default)]
pub struct WithinOls;

impl Estimator for WithinOls {
    fn name(&self) -> &'static str {
        "within-ols"
    }

    fn fit(&self, input: &RegressionInput) -> anyhow::Result<FitSummary> {
        let n = input.n_obs();
        if n == 0 {
            bail!("empty design");
        }
        for (name, column) in input.regressors.iter().zip(&input.columns) {
            if column.len() != n {
                bail!("regressor '{name}' has {} rows, expected {n}", column.len());
            }
            if column.iter().any(|v| !v.is_finite()) {
                bail!("regressor '{name}' contains non-finite values");
            }
        }

        // Year dummies (first year omitted), then demean everything within
        // entity to absorb entity effects.
        let mut years: Vec<i32> = input.year.clone();
        years.sort_unstable();
        years.dedup();

        let mut names: Vec<String> = input.regressors.clone();
        let mut columns: Vec<Vec<f64>> = input.columns.clone();
        for &year in years.iter().skip(1) {
            names.push(format!("year_{year}"));
            columns.push(
                input
                    .year
                    .iter()
                    .map(|&y| if y == year { 1.0 } else { 0.0 })
                    .collect(),
            );
        }

        let k = names.len();
        let df = n as i64 - k as i64 - input.n_entities as i64;
        if df <= 0 {
            bail!("insufficient degrees of freedom: {n} obs, {k} regressors, {} entities", input.n_entities);
        }

        let y = demean_by_entity(&input.dependent, &input.entity, input.n_entities);
        for column in &mut columns {
            *column = demean_by_entity(column, &input.entity, input.n_entities);
        }

        let mut x = DMatrix::<f64>::zeros(n, k);
        for (j, column) in columns.iter().enumerate() {
            for (i, &v) in column.iter().enumerate() {
                x[(i, j)] = v;
            }
        }
        let y = DVector::from_vec(y);

        let xtx = x.transpose() * &x;
        let xtx_inv = xtx
            .try_inverse()
            .ok_or_else(|| anyhow!("singular design matrix (collinear or absorbed regressors)"))?;
        let beta = &xtx_inv * (x.transpose() * &y);
        let residuals = &y - &x * &beta;

        // Entity-clustered sandwich with the usual small-sample correction.
        let g = input.n_entities as f64;
        if g < 2.0 {
            bail!("clustered errors need at least 2 entities");
        }
        let mut meat = DMatrix::<f64>::zeros(k, k);
        for cluster in 0..input.n_entities {
            let mut score = DVector::<f64>::zeros(k);
            for (i, &e) in input.entity.iter().enumerate() {
                if e == cluster {
                    for j in 0..k {
                        score[j] += x[(i, j)] * residuals[i];
                    }
                }
            }
            meat += &score * score.transpose();
        }
        let correction = (g / (g - 1.0)) * ((n as f64 - 1.0) / df as f64);
        let vcov = &xtx_inv * meat * &xtx_inv * correction;

        let mut summary = FitSummary {
            nobs: n,
            ..FitSummary::default()
        };
        for (j, name) in names.iter().enumerate() {
            let se = vcov[(j, j)].max(0.0).sqrt();
            let b = beta[j];
            summary.params.insert(name.clone(), b);
            summary.std_errors.insert(name.clone(), se);
            let p = if se > 0.0 {
                stats::two_sided_p(b / se)
            } else {
                f64::NAN
            };
            summary.pvalues.insert(name.clone(), p);
        }
        Ok(summary)
    }
}

fn demean_by_entity(values: &[f64], entity: &[usize], n_entities: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n_entities];
    let mut counts = vec![0usize; n_entities];
    for (&v, &e) in values.iter().zip(entity) {
        sums[e] += v;
        counts[e] += 1;
    }
    values
        .iter()
        .zip(entity)
        .map(|(&v, &e)| v - sums[e] / counts[e] as f64)
        .collect()
}
