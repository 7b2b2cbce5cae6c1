//! Panel assembly: the join sequence that defines the estimation sample.
//!
//! Join order matters. The treatment source (IFR robots) is inner-joined
//! against the growth accounts on the full canonical key — both sides must
//! have a record for a row to exist at all. Country-level sources (macro
//! aggregates, institutional baselines) are then left-joined: their absence
//! produces missing values, never dropped rows. Treatment and outcome
//! availability gate the sample; control and moderator availability do not.

use rustc_hash::FxHashMap;

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::normalize::{CountryTables, IndustryCrosswalk};
use crate::panel::row::PanelRow;
use crate::source::LoadOutcome;
use crate::source::eurostat::CountryYearSeries;
use crate::source::ictwss::{self, IctwssTable};
use crate::source::ifr::IfrTable;
use crate::source::klems::KlemsTable;

/// Everything the assembler joins. Required sources are plain load
/// outcomes here too; this is where absence of either becomes fatal.
#[derive(Debug)]
pub struct PanelSources {
    pub ifr: LoadOutcome<IfrTable>,
    pub klems: LoadOutcome<KlemsTable>,
    pub gdp: LoadOutcome<CountryYearSeries>,
    pub unemployment: LoadOutcome<CountryYearSeries>,
    pub ictwss: LoadOutcome<IctwssTable>,
}

/// Row accounting for one assembly run
#[derive(Debug, Default, Clone)]
pub struct AssemblySummary {
    /// IFR rows surviving the EU / crosswalk / window filters
    pub treatment_rows: usize,
    /// IFR rows dropped for an unmapped industry code
    pub dropped_unmapped_industry: usize,
    /// Rows out of the sample-defining inner join
    pub matched_rows: usize,
    /// Treatment rows without a growth-accounts match
    pub unmatched_treatment_rows: usize,
}

/// Assemble the candidate panel (raw values plus treatment-side logs and
/// lags; remaining derived variables are the derive stage's job).
///
/// Fatal only when a required source (treatment or outcome) is absent or
/// when nothing survives the sample-defining join.
pub fn assemble(
    sources: &PanelSources,
    config: &PanelConfig,
    countries: &CountryTables,
    crosswalk: &IndustryCrosswalk,
) -> Result<(Vec<PanelRow>, AssemblySummary)> {
    let ifr = require(&sources.ifr, "IFR robots")?;
    let klems = require(&sources.klems, "KLEMS growth accounts")?;
    let mut summary = AssemblySummary::default();

    // 1. Treatment source: EU members, mapped industries, window with lag
    //    preload years so the first target year has a defined lag.
    let mut treatment: Vec<&crate::source::ifr::IfrRecord> = ifr
        .rows
        .iter()
        .filter(|r| countries.is_eu(&r.country_code))
        .filter(|r| r.year >= config.lag_preload_from && r.year <= config.year_max)
        .collect();
    summary.dropped_unmapped_industry = treatment
        .iter()
        .filter(|r| !crosswalk.contains(&r.industry_code))
        .count();
    treatment.retain(|r| crosswalk.contains(&r.industry_code));
    treatment.sort_by(|a, b| {
        (&a.country_code, &a.industry_code, a.year)
            .cmp(&(&b.country_code, &b.industry_code, b.year))
    });
    summary.treatment_rows = treatment.len();

    // ln of robots per 1000 workers; zero stocks are missing by policy,
    // keyed for the year-arithmetic lag lookup.
    let ln_robots_by_key: FxHashMap<(&str, &str, i32), f64> = treatment
        .iter()
        .filter_map(|r| {
            ln_positive(r.robot_wrkr_stock_95?)
                .map(|ln| ((r.country_code.as_str(), r.industry_code.as_str(), r.year), ln))
        })
        .collect();

    // 2. Join maps for the right-hand sides.
    let klems_by_key: FxHashMap<(&str, &str, i32), &crate::source::klems::KlemsWideRow> = klems
        .rows
        .iter()
        .map(|r| ((r.country_code.as_str(), r.nace_r2_code.as_str(), r.year), r))
        .collect();
    let gdp_by_key = sources.gdp.table().map(CountryYearSeries::by_key);
    let une_by_key = sources.unemployment.table().map(CountryYearSeries::by_key);
    let baseline_by_country = institutional_baseline(sources.ictwss.table(), config);

    // 3. Sample-defining inner join, then country-level left joins.
    let mut rows = Vec::new();
    for record in treatment {
        if record.year < config.year_min {
            continue; // preload years only feed the lag
        }
        // already counted and retained out above; unmapped never defaults
        let Some(nace) = crosswalk.to_nace(&record.industry_code) else {
            continue;
        };
        let Some(klems_row) =
            klems_by_key.get(&(record.country_code.as_str(), nace, record.year))
        else {
            summary.unmatched_treatment_rows += 1;
            continue;
        };

        let key = (record.country_code.clone(), record.year);
        let gdp = gdp_by_key.as_ref().and_then(|m| m.get(&key)).copied();
        let unemployment = une_by_key.as_ref().and_then(|m| m.get(&key)).copied();
        let baseline = baseline_by_country.get(&record.country_code);

        let ln_robots = ln_robots_by_key
            .get(&(record.country_code.as_str(), record.industry_code.as_str(), record.year))
            .copied();
        let ln_robots_lag1 = ln_robots_by_key
            .get(&(
                record.country_code.as_str(),
                record.industry_code.as_str(),
                record.year - 1,
            ))
            .copied();

        rows.push(PanelRow {
            country_code: record.country_code.clone(),
            industry_code: record.industry_code.clone(),
            nace_r2_code: nace.to_string(),
            year: record.year,
            entity: format!("{}_{}", record.country_code, record.industry_code),
            year_int: record.year,
            ln_hours: None,
            ln_robots,
            ln_robots_lag1,
            ln_va: None,
            ln_cap: None,
            ln_gdp: None,
            unemployment,
            adjcov: baseline.and_then(|b| b.0),
            coord: baseline.and_then(|b| b.1),
            adjcov_centered: None,
            high_coord: None,
            high_robot_industry: 0,
            robot_wrkr_stock_95: record.robot_wrkr_stock_95,
            lab_qi: klems_row.lab_qi,
            va_pyp: klems_row.va_pyp,
            cap_qi: klems_row.cap_qi,
            gdp,
        });
    }
    summary.matched_rows = rows.len();

    if rows.is_empty() {
        return Err(PanelError::EmptyPanel(
            "treatment and growth accounts share no (country, industry, year) key".to_string(),
        ));
    }

    log::info!(
        "Assembled {} candidate rows ({} treatment rows unmatched, {} unmapped industries dropped)",
        summary.matched_rows,
        summary.unmatched_treatment_rows,
        summary.dropped_unmapped_industry
    );
    Ok((rows, summary))
}

/// ln(x) for strictly positive x; zero and negative are missing by policy
#[must_use]
pub fn ln_positive(x: f64) -> Option<f64> {
    (x > 0.0).then(|| x.ln())
}

fn require<'a, T>(outcome: &'a LoadOutcome<T>, name: &str) -> Result<&'a T> {
    match outcome {
        LoadOutcome::Loaded { table, .. } => Ok(table),
        LoadOutcome::Absent { reason } => Err(PanelError::RequiredSourceAbsent {
            name: name.to_string(),
            reason: reason.clone(),
        }),
    }
}

/// Time-invariant (AdjCov, Coord) baseline per country, broadcast onto
/// every panel year of that country
fn institutional_baseline(
    table: Option<&IctwssTable>,
    config: &PanelConfig,
) -> FxHashMap<String, (Option<f64>, Option<f64>)> {
    let Some(table) = table else {
        return FxHashMap::default();
    };
    ictwss::baseline(table, config.baseline_window)
        .into_iter()
        .map(|b| (b.country_code, (b.adj_cov, b.coord)))
        .collect()
}
