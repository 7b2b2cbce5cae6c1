//! KLEMS growth-accounts source (long format, pivoted to wide).
//!
//! Outcome and industry-level controls. Rows arrive long, keyed by
//! (`geo_code`, `nace_r2_code`, `year`, `var`, `value`), and are pivoted on
//! `var` with a first-wins duplicate policy before use. Required source.

use std::collections::BTreeSet;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::normalize::CountryTables;
use crate::source::ifr::candidate_list;
use crate::source::{LoadOutcome, open_csv, parse_f64, parse_year, resolve_candidates};

/// `var` values the pipeline needs from the growth accounts
pub const REQUIRED_VARS: [&str; 6] = [
    "VA_PYP", "CAP_QI", "CAPICT_QI", "CAPNICT_QI", "LAB", "LAB_QI",
];

/// One pivoted (wide) KLEMS row
#[derive(Debug, Clone, Default)]
pub struct KlemsWideRow {
    pub country_code: String,
    pub nace_r2_code: String,
    pub year: i32,
    /// Value added, previous-year prices
    pub va_pyp: Option<f64>,
    /// Capital services volume index
    pub cap_qi: Option<f64>,
    /// ICT capital services volume index
    pub capict_qi: Option<f64>,
    /// Non-ICT capital services volume index
    pub capnict_qi: Option<f64>,
    /// Labour compensation
    pub lab: Option<f64>,
    /// Labour services volume index (labour-input proxy; hours are not
    /// reported standalone in the growth accounts)
    pub lab_qi: Option<f64>,
}

impl KlemsWideRow {
    fn slot(&mut self, var: &str) -> Option<&mut Option<f64>> {
        match var {
            "VA_PYP" => Some(&mut self.va_pyp),
            "CAP_QI" => Some(&mut self.cap_qi),
            "CAPICT_QI" => Some(&mut self.capict_qi),
            "CAPNICT_QI" => Some(&mut self.capnict_qi),
            "LAB" => Some(&mut self.lab),
            "LAB_QI" => Some(&mut self.lab_qi),
            _ => None,
        }
    }
}

/// KLEMS source table after the long → wide pivot
#[derive(Debug)]
pub struct KlemsTable {
    /// Wide rows, sorted by (country, nace, year)
    pub rows: Vec<KlemsWideRow>,
    /// Distinct `var` values seen in the raw file
    pub vars_present: BTreeSet<String>,
    pub raw_columns: Vec<String>,
    pub dropped_unresolved: usize,
}

/// Load and pivot the KLEMS growth accounts
#[must_use]
pub fn load(candidates: &[PathBuf], countries: &CountryTables) -> LoadOutcome<KlemsTable> {
    let Some(path) = resolve_candidates(candidates) else {
        return LoadOutcome::Absent {
            reason: format!("no candidate file exists (tried {})", candidate_list(candidates)),
        };
    };
    let (mut reader, columns) = match open_csv(&path) {
        Ok(v) => v,
        Err(reason) => return LoadOutcome::Absent { reason },
    };

    let mut wide: FxHashMap<(String, String, i32), KlemsWideRow> = FxHashMap::default();
    let mut vars_present = BTreeSet::new();
    let mut dropped_unresolved = 0usize;

    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(raw_geo) = columns.get(&record, "geo_code") else {
            continue;
        };
        let Some(country_code) = countries.normalize(raw_geo) else {
            dropped_unresolved += 1;
            continue;
        };
        let Some(nace) = columns.get(&record, "nace_r2_code") else {
            continue;
        };
        let Some(year) = columns.get(&record, "year").and_then(parse_year) else {
            continue;
        };
        let Some(var) = columns.get(&record, "var") else {
            continue;
        };
        let var = var.trim().to_string();
        vars_present.insert(var.clone());
        if !REQUIRED_VARS.contains(&var.as_str()) {
            continue;
        }
        let value = columns.get(&record, "value").and_then(parse_f64);

        let entry = wide
            .entry((country_code.clone(), nace.to_string(), year))
            .or_insert_with(|| KlemsWideRow {
                country_code,
                nace_r2_code: nace.to_string(),
                year,
                ..KlemsWideRow::default()
            });
        if let Some(slot) = entry.slot(&var) {
            // first-wins: duplicate (key, var) observations do not overwrite
            if slot.is_none() {
                *slot = value;
            }
        }
    }

    let mut rows: Vec<KlemsWideRow> = wide.into_values().collect();
    rows.sort_by(|a, b| {
        (&a.country_code, &a.nace_r2_code, a.year).cmp(&(&b.country_code, &b.nace_r2_code, b.year))
    });

    log::info!(
        "Loaded KLEMS: {} wide rows from {} ({} unresolved geo tokens dropped)",
        rows.len(),
        path.display(),
        dropped_unresolved
    );
    LoadOutcome::Loaded {
        table: KlemsTable {
            rows,
            vars_present,
            raw_columns: columns.columns().to_vec(),
            dropped_unresolved,
        },
        resolved_from: path,
    }
}
