//! Pre-assembly data check: per-source presence, year coverage against the
//! target window, required columns, and EU country coverage.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::PanelConfig;
use crate::normalize::CountryTables;
use crate::panel::assemble::PanelSources;
use crate::source::{ifr, ictwss, klems};
use crate::utils::logging::{fail, ok, section, warn};

/// Coverage findings for one source
#[derive(Debug, Clone)]
pub struct SourceCheck {
    pub name: &'static str,
    pub present: bool,
    /// Which candidate file was actually read (explicit fallback chains)
    pub resolved_from: Option<PathBuf>,
    pub absent_reason: Option<String>,
    pub year_range: Option<(i32, i32)>,
    /// Target-window years the source lacks; a report, not an error
    pub missing_years: Vec<i32>,
    /// Required columns or variables the source lacks
    pub missing_required: Vec<String>,
    /// Distinct EU member countries covered
    pub eu_countries: usize,
    /// Member codes with no rows at all
    pub missing_eu: Vec<String>,
    /// Rows whose identifiers resolved to nothing (dropped upstream but
    /// still counted here)
    pub dropped_unresolved: usize,
    pub notes: Vec<String>,
}

impl SourceCheck {
    fn absent(name: &'static str, reason: &str) -> Self {
        Self {
            name,
            present: false,
            resolved_from: None,
            absent_reason: Some(reason.to_string()),
            year_range: None,
            missing_years: Vec::new(),
            missing_required: Vec::new(),
            eu_countries: 0,
            missing_eu: Vec::new(),
            dropped_unresolved: 0,
            notes: Vec::new(),
        }
    }

    fn present(name: &'static str, resolved_from: PathBuf) -> Self {
        Self {
            resolved_from: Some(resolved_from),
            present: true,
            absent_reason: None,
            ..Self::absent(name, "")
        }
    }
}

/// The full pre-assembly report
#[derive(Debug, Clone)]
pub struct DataCheckReport {
    pub sources: Vec<SourceCheck>,
    /// Summary of potential gaps, in display order
    pub issues: Vec<String>,
}

/// Run the data check over the loaded sources
#[must_use]
pub fn run(
    sources: &PanelSources,
    config: &PanelConfig,
    countries: &CountryTables,
) -> DataCheckReport {
    let mut checks = Vec::new();
    let mut issues = Vec::new();

    // IFR
    match &sources.ifr {
        crate::source::LoadOutcome::Loaded { table, resolved_from } => {
            let mut check = SourceCheck::present("IFR robots", resolved_from.clone());
            fill_year_coverage(
                &mut check,
                table.rows.iter().map(|r| r.year),
                config,
            );
            check.missing_required = missing_from(
                &ifr::REQUIRED_COLUMNS,
                &table.raw_columns.iter().map(String::as_str).collect::<Vec<_>>(),
            );
            fill_eu_coverage(
                &mut check,
                table.rows.iter().map(|r| r.country_code.as_str()),
                countries,
            );
            check.dropped_unresolved = table.dropped_unresolved;
            checks.push(check);
        }
        crate::source::LoadOutcome::Absent { reason } => {
            issues.push("IFR robots missing (required)".to_string());
            checks.push(SourceCheck::absent("IFR robots", reason));
        }
    }

    // KLEMS
    match &sources.klems {
        crate::source::LoadOutcome::Loaded { table, resolved_from } => {
            let mut check = SourceCheck::present("KLEMS growth accounts", resolved_from.clone());
            fill_year_coverage(&mut check, table.rows.iter().map(|r| r.year), config);
            check.missing_required = klems::REQUIRED_VARS
                .iter()
                .filter(|v| !table.vars_present.contains(**v))
                .map(ToString::to_string)
                .collect();
            fill_eu_coverage(
                &mut check,
                table.rows.iter().map(|r| r.country_code.as_str()),
                countries,
            );
            check.dropped_unresolved = table.dropped_unresolved;
            check.notes.push(format!(
                "Greece coded as {} (canonical spelling this run)",
                countries.canonical_greece()
            ));
            check
                .notes
                .push("labour input proxy: LAB_QI (hours not standalone)".to_string());
            checks.push(check);
        }
        crate::source::LoadOutcome::Absent { reason } => {
            issues.push("KLEMS growth accounts missing (required)".to_string());
            checks.push(SourceCheck::absent("KLEMS growth accounts", reason));
        }
    }

    // ICTWSS
    match &sources.ictwss {
        crate::source::LoadOutcome::Loaded { table, resolved_from } => {
            let mut check = SourceCheck::present("ICTWSS institutions", resolved_from.clone());
            fill_year_coverage(&mut check, table.rows.iter().map(|r| r.year), config);
            check.missing_required = missing_from(
                &ictwss::REQUIRED_COLUMNS,
                &table.raw_columns.iter().map(String::as_str).collect::<Vec<_>>(),
            );
            fill_eu_coverage(
                &mut check,
                table.rows.iter().map(|r| r.country_code.as_str()),
                countries,
            );
            check.dropped_unresolved = table.dropped_unresolved;

            let gaps: Vec<String> = ictwss::baseline(table, config.baseline_window)
                .into_iter()
                .filter(|b| b.adj_cov.is_none() || b.coord.is_none())
                .map(|b| b.country_code)
                .collect();
            if !gaps.is_empty() {
                issues.push(format!(
                    "ICTWSS: countries missing AdjCov/Coord in the {}–{} baseline: {}",
                    config.baseline_window.0,
                    config.baseline_window.1,
                    gaps.join(", ")
                ));
            }
            checks.push(check);
        }
        crate::source::LoadOutcome::Absent { reason } => {
            issues.push("ICTWSS institutions missing (moderators degrade to missing)".to_string());
            checks.push(SourceCheck::absent("ICTWSS institutions", reason));
        }
    }

    // Eurostat series
    for (name, outcome) in [
        ("Eurostat GDP", &sources.gdp),
        ("Eurostat unemployment", &sources.unemployment),
    ] {
        match outcome {
            crate::source::LoadOutcome::Loaded { table, resolved_from } => {
                let mut check = SourceCheck::present(name, resolved_from.clone());
                fill_year_coverage(&mut check, table.rows.iter().map(|r| r.year), config);
                fill_eu_coverage(
                    &mut check,
                    table.rows.iter().map(|r| r.country_code.as_str()),
                    countries,
                );
                check.dropped_unresolved = table.dropped_unresolved;
                checks.push(check);
            }
            crate::source::LoadOutcome::Absent { reason } => {
                issues.push(format!("{name} missing"));
                checks.push(SourceCheck::absent(name, reason));
            }
        }
    }

    DataCheckReport { sources: checks, issues }
}

/// Log the report in the banner-sectioned console format
pub fn log_report(report: &DataCheckReport) {
    for (i, check) in report.sources.iter().enumerate() {
        section(&format!("{}. {}", i + 1, check.name));
        if !check.present {
            fail(&format!(
                "{} not loaded: {}",
                check.name,
                check.absent_reason.as_deref().unwrap_or("unknown")
            ));
            continue;
        }
        if let Some(path) = &check.resolved_from {
            ok(&format!("resolved from {}", path.display()));
        }
        match (&check.year_range, check.missing_years.is_empty()) {
            (Some((min, max)), true) => ok(&format!("years {min}–{max}")),
            (Some((min, max)), false) => warn(&format!(
                "years {min}–{max}, missing {} target years: {:?}{}",
                check.missing_years.len(),
                &check.missing_years[..check.missing_years.len().min(5)],
                if check.missing_years.len() > 5 { "..." } else { "" }
            )),
            (None, _) => warn("no usable years"),
        }
        for missing in &check.missing_required {
            warn(&format!("{missing}: MISSING"));
        }
        if check.missing_required.is_empty() {
            ok("required columns present");
        }
        ok(&format!("EU countries: {}", check.eu_countries));
        if !check.missing_eu.is_empty() {
            warn(&format!("Missing EU: {:?}", check.missing_eu));
        }
        if check.dropped_unresolved > 0 {
            warn(&format!(
                "{} rows with unresolvable identifiers (dropped upstream)",
                check.dropped_unresolved
            ));
        }
        for note in &check.notes {
            ok(note);
        }
    }

    section("SUMMARY: Potential Gaps");
    if report.issues.is_empty() {
        ok("No critical gaps identified");
    } else {
        for (i, issue) in report.issues.iter().enumerate() {
            warn(&format!("{}. {issue}", i + 1));
        }
    }
}

fn fill_year_coverage(
    check: &mut SourceCheck,
    years: impl Iterator<Item = i32>,
    config: &PanelConfig,
) {
    let years: BTreeSet<i32> = years.collect();
    check.year_range = years
        .iter()
        .next()
        .copied()
        .zip(years.iter().next_back().copied());
    check.missing_years = config
        .target_years()
        .into_iter()
        .filter(|y| !years.contains(y))
        .collect();
}

fn fill_eu_coverage<'a>(
    check: &mut SourceCheck,
    codes: impl Iterator<Item = &'a str>,
    countries: &CountryTables,
) {
    let seen: BTreeSet<&str> = codes.filter(|c| countries.is_eu(c)).collect();
    check.eu_countries = seen.len();
    check.missing_eu = countries
        .member_codes()
        .into_iter()
        .filter(|c| !seen.contains(c.as_str()))
        .collect();
}

fn missing_from(required: &[&str], available: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|r| !available.contains(*r))
        .map(ToString::to_string)
        .collect()
}
