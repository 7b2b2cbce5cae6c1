//! Industry-by-industry coverage moderation.
//!
//! For each NACE industry separately, regress labour input on the lagged
//! robot treatment and its interaction with centered bargaining coverage,
//! absorbing entity and time effects. Industries failing the usability
//! gate are skipped with a recorded reason; estimator failures are caught
//! at the subgroup boundary and recorded, never propagated.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use serde::Serialize;

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::estimate::model::{Estimator, RegressionInput};
use crate::estimate::prep::{prepare_panel, select_controls};
use crate::gate::{self, GateDecision};
use crate::panel::artifact::PanelArtifact;
use crate::panel::row::PanelRow;
use crate::utils::logging::{BAR, SEP};

/// Variables every subgroup regression requires before controls
const REQUIRE: [&str; 6] = [
    "ln_hours",
    "ln_robots_lag1",
    "ln_va",
    "ln_cap",
    "adjcov",
    "adjcov_centered",
];

/// One estimated industry
#[derive(Debug, Clone, Serialize)]
pub struct IndustryResult {
    pub industry: String,
    pub n_obs: usize,
    pub n_countries: usize,
    pub beta_robot_baseline: f64,
    pub beta_coverage: f64,
    pub se_coverage: f64,
    pub pval_coverage: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub significant: bool,
}

/// One industry excluded by the gate
#[derive(Debug, Clone, Serialize)]
pub struct SkippedIndustry {
    pub industry: String,
    pub reason: String,
    pub n_obs: usize,
}

/// One industry where the external estimator failed
#[derive(Debug, Clone, Serialize)]
pub struct FailedIndustry {
    pub industry: String,
    pub reason: String,
    pub n_obs: usize,
}

/// Everything one heterogeneity run produced
#[derive(Debug)]
pub struct HeterogeneityOutcome {
    /// Estimated industries, sorted by interaction p-value
    pub results: Vec<IndustryResult>,
    pub skipped: Vec<SkippedIndustry>,
    pub failed: Vec<FailedIndustry>,
    pub n_industries: usize,
}

impl HeterogeneityOutcome {
    #[must_use]
    pub fn n_significant(&self) -> usize {
        self.results.iter().filter(|r| r.significant).count()
    }
}

/// Run the per-industry loop over a validated panel artifact
pub fn run_industry_heterogeneity(
    artifact: &PanelArtifact,
    estimator: &dyn Estimator,
    config: &PanelConfig,
) -> Result<HeterogeneityOutcome> {
    // The centering column is produced exactly once, by the derive stage;
    // recomputing it per subgroup would shift effect interpretation across
    // sub-models, so its absence is a schema defect, not a fallback path.
    if !artifact.manifest.columns.iter().any(|c| c == "adjcov_centered") {
        return Err(PanelError::SchemaMismatch {
            path: std::path::PathBuf::from("cleaned_data.manifest.json"),
            detail: "centered moderator column 'adjcov_centered' not declared".to_string(),
        });
    }

    let controls = select_controls(&artifact.rows);
    let mut require: Vec<&str> = REQUIRE.to_vec();
    require.extend(&controls);
    let prepared = prepare_panel(&artifact.rows, &require);

    let industries: Vec<String> = prepared
        .iter()
        .map(|r| r.nace_r2_code.clone())
        .sorted()
        .dedup()
        .collect();

    log::info!("\n{BAR}");
    log::info!("  Running industry-by-industry coverage moderation ({})", estimator.name());
    log::info!("  Industries to test: {}", industries.len());
    log::info!("{SEP}");

    let progress = ProgressBar::new(industries.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{msg:<12} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    let mut failed = Vec::new();

    for industry in &industries {
        progress.set_message(industry.clone());
        let subgroup: Vec<&PanelRow> = prepared
            .iter()
            .filter(|r| &r.nace_r2_code == industry)
            .collect();

        match gate::evaluate(&subgroup, |r| r.adjcov_centered, &config.gate) {
            GateDecision::Skipped { reason, n_obs } => {
                log::warn!("  Skipping {industry}: {reason}");
                skipped.push(SkippedIndustry {
                    industry: industry.clone(),
                    reason,
                    n_obs,
                });
                progress.inc(1);
                continue;
            }
            GateDecision::Usable { n_obs, n_countries } => {
                let input = build_input(&subgroup, &controls);
                match estimator.fit(&input) {
                    Err(error) => {
                        log::error!("  {industry}: {error}");
                        failed.push(FailedIndustry {
                            industry: industry.clone(),
                            reason: error.to_string(),
                            n_obs,
                        });
                    }
                    Ok(fit) => {
                        let beta = fit.param("ln_robots_adjcov");
                        let se = fit.std_error("ln_robots_adjcov");
                        let pval = fit.pvalue("ln_robots_adjcov");
                        let significant = !pval.is_nan() && pval < 0.10;
                        log::info!(
                            "  {industry}: beta_cov={}{beta:.4} (p={pval:.3}){}, N={n_obs}, countries={n_countries}",
                            if beta >= 0.0 { "+" } else { "" },
                            stars(pval)
                        );
                        results.push(IndustryResult {
                            industry: industry.clone(),
                            n_obs: fit.nobs,
                            n_countries,
                            beta_robot_baseline: fit.param("ln_robots_lag1"),
                            beta_coverage: beta,
                            se_coverage: se,
                            pval_coverage: pval,
                            ci_lower: beta - 1.96 * se,
                            ci_upper: beta + 1.96 * se,
                            significant,
                        });
                    }
                }
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    results.sort_by(|a, b| {
        a.pval_coverage
            .partial_cmp(&b.pval_coverage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::info!("{SEP}");
    log::info!("  Completed: {}/{} industries", results.len(), industries.len());
    log::info!(
        "    Positive coverage effects: {}",
        results.iter().filter(|r| r.beta_coverage >= 0.0).count()
    );
    log::info!(
        "    Negative coverage effects: {}",
        results.iter().filter(|r| r.beta_coverage < 0.0).count()
    );
    log::info!("    Significant (p<0.10): {}", results.iter().filter(|r| r.significant).count());
    if !skipped.is_empty() {
        log::info!("    Skipped: {}", skipped.len());
    }
    if !failed.is_empty() {
        log::info!("    Failed: {}", failed.len());
    }
    log::info!("{BAR}");

    Ok(HeterogeneityOutcome {
        results,
        skipped,
        failed,
        n_industries: industries.len(),
    })
}

/// Build the subgroup design: treatment, interaction, controls
fn build_input(subgroup: &[&PanelRow], controls: &[&'static str]) -> RegressionInput {
    let mut entity_index: BTreeMap<&str, usize> = BTreeMap::new();
    for row in subgroup {
        let next = entity_index.len();
        entity_index.entry(row.entity.as_str()).or_insert(next);
    }

    let mut regressors = vec!["ln_robots_lag1".to_string(), "ln_robots_adjcov".to_string()];
    regressors.extend(controls.iter().map(ToString::to_string));

    // requirement subsetting upstream guarantees these are present
    let column = |name: &str| -> Vec<f64> {
        subgroup
            .iter()
            .map(|r| match name {
                "ln_robots_adjcov" => {
                    r.ln_robots_lag1.unwrap_or(f64::NAN) * r.adjcov_centered.unwrap_or(f64::NAN)
                }
                other => r.var(other).unwrap_or(f64::NAN),
            })
            .collect()
    };

    RegressionInput {
        dependent: subgroup
            .iter()
            .map(|r| r.ln_hours.unwrap_or(f64::NAN))
            .collect(),
        columns: regressors.iter().map(|n| column(n)).collect(),
        regressors,
        entity: subgroup.iter().map(|r| entity_index[r.entity.as_str()]).collect(),
        year: subgroup.iter().map(|r| r.year_int).collect(),
        n_entities: entity_index.len(),
    }
}

pub(crate) fn stars(pval: f64) -> &'static str {
    if pval.is_nan() {
        ""
    } else if pval < 0.01 {
        "***"
    } else if pval < 0.05 {
        "**"
    } else if pval < 0.10 {
        "*"
    } else {
        ""
    }
}

/// Persist the machine-readable result table (sorted by p-value) and the
/// fixed-width text summary
pub fn write_outputs(outcome: &HeterogeneityOutcome, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    if outcome.results.is_empty() {
        log::warn!("  No industries produced valid results.");
        return Ok(());
    }

    let csv_path = output_dir.join("industry_by_industry_coverage.csv");
    let mut writer = csv::Writer::from_path(&csv_path)?;
    for row in &outcome.results {
        writer.serialize(row)?;
    }
    writer.flush().map_err(PanelError::from)?;
    log::info!("  Results CSV saved: {}", csv_path.display());

    let txt_path = output_dir.join("industry_coverage_summary.txt");
    std::fs::write(&txt_path, render_summary(outcome))?;
    log::info!("  Summary TXT saved: {}", txt_path.display());
    Ok(())
}

fn render_summary(outcome: &HeterogeneityOutcome) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Industry-by-Industry Coverage Moderation");
    let _ = writeln!(text, "{}", "=".repeat(80));
    let _ = writeln!(
        text,
        "Model: ln_hours ~ ln_robots_lag1 + ln_robots_lag1*adjcov_centered + controls + FE"
    );
    let _ = writeln!(text, "Each row = separate regression for one NACE industry");
    let _ = writeln!(
        text,
        "beta_coverage = change in robot effect per 1pp increase in bargaining coverage"
    );
    let _ = writeln!(text, "{}\n", "-".repeat(80));
    let _ = writeln!(
        text,
        "{:<12} {:>6} {:>6} {:>12} {:>10} {:>10} {:>24} {:>5}",
        "Industry", "N_obs", "N_ctry", "beta_cov", "SE", "p-value", "95% CI", "Sig"
    );
    let _ = writeln!(text, "{}", "-".repeat(90));
    for row in &outcome.results {
        let _ = writeln!(
            text,
            "{:<12} {:>6} {:>6} {:>12.4} {:>10.4} {:>10.4} [{:>10.4}, {:>10.4}] {:>5}",
            row.industry,
            row.n_obs,
            row.n_countries,
            row.beta_coverage,
            row.se_coverage,
            row.pval_coverage,
            row.ci_lower,
            row.ci_upper,
            if row.significant { "*" } else { "" }
        );
    }
    let _ = writeln!(text, "{}\n", "-".repeat(90));
    let _ = writeln!(text, "Summary:");
    let _ = writeln!(
        text,
        "  Industries estimated: {}/{}",
        outcome.results.len(),
        outcome.n_industries
    );
    let _ = writeln!(
        text,
        "  Positive coverage effects: {}",
        outcome.results.iter().filter(|r| r.beta_coverage >= 0.0).count()
    );
    let _ = writeln!(
        text,
        "  Negative coverage effects: {}",
        outcome.results.iter().filter(|r| r.beta_coverage < 0.0).count()
    );
    let _ = writeln!(text, "  Significant at 10%: {}", outcome.n_significant());
    if !outcome.skipped.is_empty() {
        let _ = writeln!(text, "\nSkipped industries:");
        for s in &outcome.skipped {
            let _ = writeln!(text, "  {}: {} (N={})", s.industry, s.reason, s.n_obs);
        }
    }
    if !outcome.failed.is_empty() {
        let _ = writeln!(text, "\nFailed industries:");
        for f in &outcome.failed {
            let _ = writeln!(text, "  {}: {} (N={})", f.industry, f.reason, f.n_obs);
        }
    }
    text
}
