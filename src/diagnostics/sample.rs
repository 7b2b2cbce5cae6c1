//! Post-assembly sample diagnostics.
//!
//! Answers the question the estimation log cannot: how much of the panel
//! survives each stricter variable requirement, and which countries fall
//! out when institutional columns are required. Purely read-only.

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::estimate::prep::{countries_of, n_entities, prepare_panel, select_controls};
use crate::panel::row::PanelRow;
use crate::utils::logging;

/// Core variables every estimation sample must carry
const CORE_VARS: [&str; 4] = ["ln_hours", "ln_robots_lag1", "ln_va", "ln_cap"];

/// Size profile of one nested estimation sample
#[derive(Debug, Clone)]
pub struct SubsetProfile {
    pub name: &'static str,
    pub n_obs: usize,
    pub n_countries: usize,
    pub n_entities: usize,
    /// Share of the baseline sample retained, in percent
    pub pct_of_baseline: f64,
    pub countries: Vec<String>,
}

/// Institutional-variable gaps for one country in the baseline sample
#[derive(Debug, Clone)]
pub struct CountryInstitutionGap {
    pub country_code: String,
    pub n_rows: usize,
    pub missing_adjcov: usize,
    pub missing_coord: usize,
}

/// Baseline vs coverage-sample observation counts per industry
#[derive(Debug, Clone)]
pub struct IndustryCoverage {
    pub nace_r2_code: String,
    pub baseline_obs: usize,
    pub coverage_obs: usize,
}

/// Full sample-diagnostics report
#[derive(Debug)]
pub struct SampleDiagnostics {
    pub baseline: SubsetProfile,
    pub coverage: SubsetProfile,
    pub coordination: SubsetProfile,
    /// Countries in the baseline sample absent from the coverage sample
    pub dropped_countries: Vec<String>,
    pub country_gaps: Vec<CountryInstitutionGap>,
    pub industry_coverage: Vec<IndustryCoverage>,
}

impl SampleDiagnostics {
    /// Profile the nested samples of an assembled, derived panel
    #[must_use]
    pub fn run(rows: &[PanelRow]) -> Self {
        let controls = select_controls(rows);
        let mut core: Vec<&str> = CORE_VARS.to_vec();
        core.extend(&controls);

        let baseline_rows = prepare_panel(rows, &core);

        let mut coverage_require = core.clone();
        coverage_require.extend(["adjcov", "adjcov_centered"]);
        let coverage_rows = prepare_panel(rows, &coverage_require);

        let mut coordination_require = core.clone();
        coordination_require.push("coord");
        let coordination_rows = prepare_panel(rows, &coordination_require);

        let baseline = profile("baseline", &baseline_rows, baseline_rows.len());
        let coverage = profile("coverage", &coverage_rows, baseline_rows.len());
        let coordination = profile("coordination", &coordination_rows, baseline_rows.len());

        let dropped_countries: Vec<String> = baseline
            .countries
            .iter()
            .filter(|c| !coverage.countries.contains(c))
            .cloned()
            .collect();

        Self {
            dropped_countries,
            country_gaps: country_gaps(&baseline_rows),
            industry_coverage: industry_coverage(&baseline_rows, &coverage_rows),
            baseline,
            coverage,
            coordination,
        }
    }

    /// Log the report in the data-check visual style
    pub fn log(&self) {
        logging::section("Sample diagnostics");
        for subset in [&self.baseline, &self.coverage, &self.coordination] {
            logging::ok(&format!(
                "{:<13} N={:<6} countries={:<3} entities={:<4} ({:.1}% of baseline)",
                subset.name, subset.n_obs, subset.n_countries, subset.n_entities, subset.pct_of_baseline
            ));
        }
        if self.dropped_countries.is_empty() {
            logging::ok("no countries lost when coverage is required");
        } else {
            logging::warn(&format!(
                "countries lost when coverage is required: {}",
                self.dropped_countries.join(", ")
            ));
        }
        for gap in &self.country_gaps {
            if gap.missing_adjcov > 0 || gap.missing_coord > 0 {
                logging::warn(&format!(
                    "{}: {}/{} rows missing adjcov, {}/{} missing coord",
                    gap.country_code, gap.missing_adjcov, gap.n_rows, gap.missing_coord, gap.n_rows
                ));
            }
        }
        log::info!("{}", logging::SEP);
        for industry in &self.industry_coverage {
            log::info!(
                "  {:<10} baseline={:<5} with coverage={}",
                industry.nace_r2_code,
                industry.baseline_obs,
                industry.coverage_obs
            );
        }
    }
}

fn profile(name: &'static str, rows: &[PanelRow], baseline_n: usize) -> SubsetProfile {
    let pct = if baseline_n == 0 {
        0.0
    } else {
        100.0 * rows.len() as f64 / baseline_n as f64
    };
    SubsetProfile {
        name,
        n_obs: rows.len(),
        n_countries: countries_of(rows).len(),
        n_entities: n_entities(rows),
        pct_of_baseline: pct,
        countries: countries_of(rows),
    }
}

fn country_gaps(rows: &[PanelRow]) -> Vec<CountryInstitutionGap> {
    let mut by_country: FxHashMap<&str, (usize, usize, usize)> = FxHashMap::default();
    for row in rows {
        let entry = by_country.entry(row.country_code.as_str()).or_default();
        entry.0 += 1;
        if row.adjcov.is_none() {
            entry.1 += 1;
        }
        if row.coord.is_none() {
            entry.2 += 1;
        }
    }
    by_country
        .into_iter()
        .map(|(country, (n_rows, missing_adjcov, missing_coord))| CountryInstitutionGap {
            country_code: country.to_string(),
            n_rows,
            missing_adjcov,
            missing_coord,
        })
        .sorted_by(|a, b| a.country_code.cmp(&b.country_code))
        .collect()
}

fn industry_coverage(baseline: &[PanelRow], coverage: &[PanelRow]) -> Vec<IndustryCoverage> {
    let mut coverage_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for row in coverage {
        *coverage_counts.entry(row.nace_r2_code.as_str()).or_default() += 1;
    }
    let mut baseline_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for row in baseline {
        *baseline_counts.entry(row.nace_r2_code.as_str()).or_default() += 1;
    }
    baseline_counts
        .into_iter()
        .map(|(industry, baseline_obs)| IndustryCoverage {
            nace_r2_code: industry.to_string(),
            baseline_obs,
            coverage_obs: coverage_counts.get(industry).copied().unwrap_or(0),
        })
        .sorted_by(|a, b| a.nace_r2_code.cmp(&b.nace_r2_code))
        .collect()
}
