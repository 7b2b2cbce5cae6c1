//! Small numeric kernels shared by the gate, derivation, and estimation
//! stages. Kept dependency-free and deterministic.

/// Mean over the given values; `None` when empty
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n − 1 denominator); `None` for fewer than
/// two values
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Complementary error function, Abramowitz & Stegun 7.1.26 with
/// reflection. Absolute error below 1.5e-7, plenty for reporting p-values.
#[must_use]
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * z);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let res = poly * (-z * z).exp();
    if x >= 0.0 { res } else { 2.0 - res }
}

/// Upper tail of the standard normal distribution
#[must_use]
pub fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Two-sided normal p-value for a t-like statistic
#[must_use]
pub fn two_sided_p(t: f64) -> f64 {
    (2.0 * normal_sf(t.abs())).min(1.0)
}
