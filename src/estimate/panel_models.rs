//! Whole-panel regressions: the pooled baseline effect and its two
//! institutional moderations.
//!
//! Three specifications share one runner. The baseline regresses labour
//! input on the lagged robot treatment and controls with two-way fixed
//! effects; the coordination model adds an interaction with the binary
//! high-coordination indicator; the coverage model adds an interaction
//! with centered bargaining coverage. A specification whose requirements
//! leave no observations is skipped, not fatal, so the baseline still
//! runs when the institutional source is absent.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::error::{PanelError, Result};
use crate::estimate::heterogeneity::stars;
use crate::estimate::model::{Estimator, RegressionInput};
use crate::estimate::prep::{countries_of, n_entities, prepare_panel, select_controls};
use crate::panel::artifact::PanelArtifact;
use crate::panel::row::PanelRow;
use crate::utils::logging::{BAR, SEP};

/// How the robot treatment is moderated, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moderator {
    /// Treatment enters alone
    None,
    /// Interaction with the binary high-coordination indicator
    HighCoord,
    /// Interaction with centered bargaining coverage
    CoverageCentered,
}

impl Moderator {
    /// Name of the interaction column, when one exists
    #[must_use]
    pub fn interaction(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::HighCoord => Some("ln_robots_high_coord"),
            Self::CoverageCentered => Some("ln_robots_adjcov"),
        }
    }

    /// Variables required beyond the core set
    fn extra_requirements(self) -> &'static [&'static str] {
        match self {
            Self::None => &[],
            Self::HighCoord => &["coord", "high_coord"],
            Self::CoverageCentered => &["adjcov", "adjcov_centered"],
        }
    }
}

/// One whole-panel specification
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub name: &'static str,
    pub moderator: Moderator,
    /// Stem of the per-model text summary file
    pub output_stem: &'static str,
}

/// The three specifications, in estimation order
pub const SPECS: [ModelSpec; 3] = [
    ModelSpec {
        name: "baseline",
        moderator: Moderator::None,
        output_stem: "baseline_regression",
    },
    ModelSpec {
        name: "coordination",
        moderator: Moderator::HighCoord,
        output_stem: "coordination_moderation",
    },
    ModelSpec {
        name: "coverage",
        moderator: Moderator::CoverageCentered,
        output_stem: "coverage_moderation",
    },
];

/// One estimated specification
#[derive(Debug, Clone, Serialize)]
pub struct ModelResult {
    pub model: String,
    pub n_obs: usize,
    pub n_entities: usize,
    pub n_countries: usize,
    pub beta_robot: f64,
    pub se_robot: f64,
    pub pval_robot: f64,
    pub beta_interaction: Option<f64>,
    pub se_interaction: Option<f64>,
    pub pval_interaction: Option<f64>,
    /// Full coefficient table, for the text summary
    #[serde(skip)]
    pub coefficients: Vec<(String, f64, f64, f64)>,
}

/// One specification that produced nothing
#[derive(Debug, Clone, Serialize)]
pub struct SkippedModel {
    pub model: String,
    pub reason: String,
}

/// Everything one whole-panel run produced
#[derive(Debug)]
pub struct PanelModelsOutcome {
    pub results: Vec<ModelResult>,
    pub skipped: Vec<SkippedModel>,
}

/// Estimate the three whole-panel specifications over a validated artifact
#[must_use]
pub fn run_panel_models(
    artifact: &PanelArtifact,
    estimator: &dyn Estimator,
) -> PanelModelsOutcome {
    let controls = select_controls(&artifact.rows);

    log::info!("\n{BAR}");
    log::info!("  Running whole-panel models ({})", estimator.name());
    log::info!("{SEP}");

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for spec in SPECS {
        let mut require = vec!["ln_hours", "ln_robots_lag1", "ln_va", "ln_cap"];
        require.extend(spec.moderator.extra_requirements());
        require.extend(&controls);
        let prepared = prepare_panel(&artifact.rows, &require);

        if prepared.is_empty() {
            log::warn!("  Skipping {}: no complete observations", spec.name);
            skipped.push(SkippedModel {
                model: spec.name.to_string(),
                reason: "no complete observations".to_string(),
            });
            continue;
        }

        let input = build_input(&prepared, spec.moderator, &controls);
        match estimator.fit(&input) {
            Err(error) => {
                log::error!("  {}: {error}", spec.name);
                skipped.push(SkippedModel {
                    model: spec.name.to_string(),
                    reason: error.to_string(),
                });
            }
            Ok(fit) => {
                let beta = fit.param("ln_robots_lag1");
                let pval = fit.pvalue("ln_robots_lag1");
                log::info!(
                    "  {}: beta_robot={beta:.4} (p={pval:.3}){}, N={}, entities={}",
                    spec.name,
                    stars(pval),
                    fit.nobs,
                    n_entities(&prepared)
                );
                let interaction = spec.moderator.interaction();
                if let Some(name) = interaction {
                    log::info!(
                        "    interaction {name}: {:.4} (p={:.3})",
                        fit.param(name),
                        fit.pvalue(name)
                    );
                    if spec.moderator == Moderator::HighCoord {
                        log::info!(
                            "    marginal effect, high coordination: {:.4}",
                            beta + fit.param(name)
                        );
                    }
                }
                results.push(ModelResult {
                    model: spec.name.to_string(),
                    n_obs: fit.nobs,
                    n_entities: n_entities(&prepared),
                    n_countries: countries_of(&prepared).len(),
                    beta_robot: beta,
                    se_robot: fit.std_error("ln_robots_lag1"),
                    pval_robot: pval,
                    beta_interaction: interaction.map(|n| fit.param(n)),
                    se_interaction: interaction.map(|n| fit.std_error(n)),
                    pval_interaction: interaction.map(|n| fit.pvalue(n)),
                    coefficients: input
                        .regressors
                        .iter()
                        .map(|n| {
                            (n.clone(), fit.param(n), fit.std_error(n), fit.pvalue(n))
                        })
                        .collect(),
                });
            }
        }
    }

    log::info!("{SEP}");
    log::info!("  Completed: {}/{} models", results.len(), SPECS.len());
    log::info!("{BAR}");

    PanelModelsOutcome { results, skipped }
}

/// Build the whole-panel design: treatment, optional interaction, controls
fn build_input(
    prepared: &[PanelRow],
    moderator: Moderator,
    controls: &[&'static str],
) -> RegressionInput {
    let mut entity_index: BTreeMap<&str, usize> = BTreeMap::new();
    for row in prepared {
        let next = entity_index.len();
        entity_index.entry(row.entity.as_str()).or_insert(next);
    }

    let mut regressors = vec!["ln_robots_lag1".to_string()];
    if let Some(name) = moderator.interaction() {
        regressors.push(name.to_string());
    }
    regressors.extend(controls.iter().map(ToString::to_string));

    // requirement subsetting upstream guarantees these are present
    let column = |name: &str| -> Vec<f64> {
        prepared
            .iter()
            .map(|r| match name {
                "ln_robots_high_coord" => {
                    r.ln_robots_lag1.unwrap_or(f64::NAN)
                        * r.high_coord.map_or(f64::NAN, f64::from)
                }
                "ln_robots_adjcov" => {
                    r.ln_robots_lag1.unwrap_or(f64::NAN) * r.adjcov_centered.unwrap_or(f64::NAN)
                }
                other => r.var(other).unwrap_or(f64::NAN),
            })
            .collect()
    };

    RegressionInput {
        dependent: prepared
            .iter()
            .map(|r| r.ln_hours.unwrap_or(f64::NAN))
            .collect(),
        columns: regressors.iter().map(|n| column(n)).collect(),
        regressors,
        entity: prepared.iter().map(|r| entity_index[r.entity.as_str()]).collect(),
        year: prepared.iter().map(|r| r.year_int).collect(),
        n_entities: entity_index.len(),
    }
}

/// Persist the combined result table and one text summary per model
pub fn write_outputs(outcome: &PanelModelsOutcome, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    if outcome.results.is_empty() {
        log::warn!("  No whole-panel model produced valid results.");
        return Ok(());
    }

    let csv_path = output_dir.join("panel_models.csv");
    let mut writer = csv::Writer::from_path(&csv_path)?;
    for row in &outcome.results {
        writer.serialize(row)?;
    }
    writer.flush().map_err(PanelError::from)?;
    log::info!("  Results CSV saved: {}", csv_path.display());

    for result in &outcome.results {
        let Some(spec) = SPECS.iter().find(|s| s.name == result.model) else {
            continue;
        };
        let txt_path = output_dir.join(format!("{}.txt", spec.output_stem));
        std::fs::write(&txt_path, render_summary(result, spec))?;
        log::info!("  Summary TXT saved: {}", txt_path.display());
    }
    Ok(())
}

fn render_summary(result: &ModelResult, spec: &ModelSpec) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Whole-Panel Model: {}", spec.name);
    let _ = writeln!(text, "{}", "=".repeat(70));
    let terms: Vec<&str> = result
        .coefficients
        .iter()
        .map(|(name, ..)| name.as_str())
        .collect();
    let _ = writeln!(text, "Model: ln_hours ~ {} + EntityFE + YearFE", terms.join(" + "));
    let _ = writeln!(
        text,
        "N = {}, entities = {}, countries = {}",
        result.n_obs, result.n_entities, result.n_countries
    );
    let _ = writeln!(text, "{}\n", "-".repeat(70));
    let _ = writeln!(
        text,
        "{:<24} {:>12} {:>10} {:>10} {:>5}",
        "Term", "Coef", "SE", "p-value", "Sig"
    );
    let _ = writeln!(text, "{}", "-".repeat(70));
    for (name, coef, se, pval) in &result.coefficients {
        let _ = writeln!(
            text,
            "{name:<24} {coef:>12.4} {se:>10.4} {pval:>10.4} {:>5}",
            stars(*pval)
        );
    }
    let _ = writeln!(text, "{}\n", "-".repeat(70));
    if spec.moderator == Moderator::HighCoord {
        if let Some(beta_interaction) = result.beta_interaction {
            let _ = writeln!(text, "Marginal effects:");
            let _ = writeln!(text, "  Low coordination:  {:.4}", result.beta_robot);
            let _ = writeln!(
                text,
                "  High coordination: {:.4}",
                result.beta_robot + beta_interaction
            );
        }
    }
    if spec.moderator == Moderator::CoverageCentered {
        let _ = writeln!(
            text,
            "beta_robot is the treatment effect at mean bargaining coverage."
        );
    }
    text
}
