//! Whole-panel model runs over a synthetic artifact.

use std::collections::BTreeMap;

use robot_panel::estimate::{Estimator, FitSummary, RegressionInput, WithinOls, run_panel_models};
use robot_panel::panel::{ArtifactManifest, PanelArtifact, PanelRow};

const COUNTRIES: [&str; 6] = ["AT", "BE", "DE", "DK", "FI", "FR"];

/// Exact linear data with entity effects, year effects, and a known
/// treatment slope, and no moderation at all: the pooled estimate must
/// recover the slope and both interaction terms must come back at zero.
fn synthetic_row(country_idx: usize, t: i32) -> PanelRow {
    let country = COUNTRIES[country_idx];
    let i = country_idx as f64;
    let tf = f64::from(t);
    let year = 1995 + t;

    let lag = 0.1 * tf + 0.05 * i + 0.02 * (((country_idx * 7 + t as usize * 3) % 5) as f64);
    let adjcov = 60.0 + 5.0 * i;
    let centered = adjcov - 72.5;
    let ln_va = 1.0 + 0.3 * tf + 0.1 * i + 0.01 * (((country_idx + 2 * t as usize) % 7) as f64);
    let ln_cap = 2.0 + 0.2 * tf - 0.05 * i + 0.015 * (((2 * country_idx + t as usize) % 6) as f64);
    let ln_hours = 5.0 + 0.5 * i + 0.3 * tf - 0.3 * lag + 0.5 * ln_va + 0.1 * ln_cap;

    PanelRow {
        country_code: country.to_string(),
        industry_code: "28".to_string(),
        nace_r2_code: "C28".to_string(),
        year,
        entity: format!("{country}_28"),
        year_int: year,
        ln_hours: Some(ln_hours),
        ln_robots: Some(lag + 0.1),
        ln_robots_lag1: Some(lag),
        ln_va: Some(ln_va),
        ln_cap: Some(ln_cap),
        ln_gdp: None,
        unemployment: None,
        adjcov: Some(adjcov),
        coord: Some(i),
        adjcov_centered: Some(centered),
        high_coord: Some(i32::from(i >= 4.0)),
        high_robot_industry: 1,
        robot_wrkr_stock_95: Some(lag.exp()),
        lab_qi: Some(ln_hours.exp()),
        va_pyp: Some(ln_va.exp()),
        cap_qi: Some(ln_cap.exp()),
        gdp: None,
    }
}

fn synthetic_artifact() -> PanelArtifact {
    let mut rows = Vec::new();
    for country_idx in 0..COUNTRIES.len() {
        for t in 0..12 {
            rows.push(synthetic_row(country_idx, t));
        }
    }
    PanelArtifact {
        manifest: ArtifactManifest::new(rows.len(), BTreeMap::new()),
        rows,
    }
}

#[test]
fn test_baseline_recovers_the_treatment_effect() {
    let artifact = synthetic_artifact();
    let outcome = run_panel_models(&artifact, &WithinOls);

    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.results.len(), 3);

    let baseline = &outcome.results[0];
    assert_eq!(baseline.model, "baseline");
    assert_eq!(baseline.n_obs, 72);
    assert_eq!(baseline.n_entities, 6);
    assert_eq!(baseline.n_countries, 6);
    assert!((baseline.beta_robot - (-0.3)).abs() < 1e-6, "{}", baseline.beta_robot);
    assert!(baseline.beta_interaction.is_none());
}

#[test]
fn test_interaction_terms_vanish_without_moderation() {
    let artifact = synthetic_artifact();
    let outcome = run_panel_models(&artifact, &WithinOls);

    for model in ["coordination", "coverage"] {
        let result = outcome
            .results
            .iter()
            .find(|r| r.model == model)
            .unwrap_or_else(|| panic!("{model} missing"));
        assert!((result.beta_robot - (-0.3)).abs() < 1e-5, "{}", result.beta_robot);
        let beta = result.beta_interaction.unwrap();
        assert!(beta.abs() < 1e-6, "{model}: {beta}");
    }
}

#[test]
fn test_absent_institutions_skip_only_moderated_models() {
    let mut artifact = synthetic_artifact();
    for row in &mut artifact.rows {
        row.adjcov = None;
        row.coord = None;
        row.adjcov_centered = None;
        row.high_coord = None;
    }

    let outcome = run_panel_models(&artifact, &WithinOls);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].model, "baseline");
    assert_eq!(outcome.skipped.len(), 2);
    for skipped in &outcome.skipped {
        assert_eq!(skipped.reason, "no complete observations");
    }
}

struct AlwaysFails;

impl Estimator for AlwaysFails {
    fn name(&self) -> &'static str {
        "always-fails"
    }

    fn fit(&self, _input: &RegressionInput) -> anyhow::Result<FitSummary> {
        anyhow::bail!("synthetic estimator failure")
    }
}

#[test]
fn test_estimator_failures_are_recorded_not_fatal() {
    let artifact = synthetic_artifact();
    let outcome = run_panel_models(&artifact, &AlwaysFails);

    assert!(outcome.results.is_empty());
    assert_eq!(outcome.skipped.len(), 3);
    assert!(outcome.skipped.iter().all(|s| s.reason.contains("synthetic estimator failure")));
}
