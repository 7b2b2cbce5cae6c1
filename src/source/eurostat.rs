//! Eurostat macro aggregates: GDP and unemployment (country × year).
//!
//! Eurostat-shaped wide extractions carry `geo` (country name),
//! `TIME_PERIOD`, and `OBS_VALUE`; geography is name-mapped and duplicate
//! (country, year) observations resolve first-wins. Both series are
//! optional country-level controls.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::normalize::CountryTables;
use crate::source::ifr::candidate_list;
use crate::source::{LoadOutcome, open_csv, parse_f64, parse_year, resolve_candidates};

/// One (country, year) observation of a macro series
#[derive(Debug, Clone)]
pub struct CountryYearValue {
    pub country_code: String,
    pub year: i32,
    pub value: f64,
}

/// A country × year macro series
#[derive(Debug)]
pub struct CountryYearSeries {
    /// Canonical variable name this series provides (`gdp`, `unemployment`)
    pub name: &'static str,
    /// Observations, sorted by (country, year)
    pub rows: Vec<CountryYearValue>,
    pub raw_columns: Vec<String>,
    pub dropped_unresolved: usize,
}

impl CountryYearSeries {
    /// Join map keyed by (country, year)
    #[must_use]
    pub fn by_key(&self) -> FxHashMap<(String, i32), f64> {
        self.rows
            .iter()
            .map(|r| ((r.country_code.clone(), r.year), r.value))
            .collect()
    }
}

/// Load a Eurostat-shaped series under a canonical variable name
#[must_use]
pub fn load_series(
    name: &'static str,
    candidates: &[PathBuf],
    countries: &CountryTables,
) -> LoadOutcome<CountryYearSeries> {
    let Some(path) = resolve_candidates(candidates) else {
        return LoadOutcome::Absent {
            reason: format!("no candidate file exists (tried {})", candidate_list(candidates)),
        };
    };
    let (mut reader, columns) = match open_csv(&path) {
        Ok(v) => v,
        Err(reason) => return LoadOutcome::Absent { reason },
    };

    let mut first: FxHashMap<(String, i32), f64> = FxHashMap::default();
    let mut order: Vec<(String, i32)> = Vec::new();
    let mut dropped_unresolved = 0usize;
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(geo) = columns.get(&record, "geo") else {
            continue;
        };
        let Some(country_code) = countries.normalize(geo) else {
            dropped_unresolved += 1;
            continue;
        };
        let Some(year) = columns.get(&record, "TIME_PERIOD").and_then(parse_year) else {
            continue;
        };
        let Some(value) = columns.get(&record, "OBS_VALUE").and_then(parse_f64) else {
            continue;
        };
        let key = (country_code, year);
        if !first.contains_key(&key) {
            first.insert(key.clone(), value);
            order.push(key);
        }
    }

    order.sort();
    let rows = order
        .into_iter()
        .map(|key| {
            let value = first[&key];
            CountryYearValue {
                country_code: key.0,
                year: key.1,
                value,
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "Loaded Eurostat {}: {} country-year observations from {}",
        name,
        rows.len(),
        path.display()
    );
    LoadOutcome::Loaded {
        table: CountryYearSeries {
            name,
            rows,
            raw_columns: columns.columns().to_vec(),
            dropped_unresolved,
        },
        resolved_from: path,
    }
}
