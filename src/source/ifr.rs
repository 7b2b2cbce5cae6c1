//! IFR robot-stock source (country × industry × year).
//!
//! The treatment source: operational robot stocks and robots per 1000
//! workers by country, IFR industry code, and year. Required — the panel
//! cannot be assembled without it, but the decision to abort belongs to the
//! assembler, not this loader.

use std::path::PathBuf;

use crate::normalize::CountryTables;
use crate::source::{LoadOutcome, open_csv, parse_f64, parse_year, resolve_candidates};

/// Required columns in the raw IFR extraction
pub const REQUIRED_COLUMNS: [&str; 3] = ["robot_stock", "robot_wrkr_stock_95", "employment"];

/// One raw IFR row after renaming and country normalization
#[derive(Debug, Clone)]
pub struct IfrRecord {
    pub country_code: String,
    pub industry_code: String,
    pub year: i32,
    pub robot_stock: Option<f64>,
    /// Robots per 1000 workers (1995 employment base)
    pub robot_wrkr_stock_95: Option<f64>,
    pub employment: Option<f64>,
}

/// IFR source table
#[derive(Debug)]
pub struct IfrTable {
    pub rows: Vec<IfrRecord>,
    /// Raw header names, for the data check
    pub raw_columns: Vec<String>,
    /// Rows dropped because the country token resolved to nothing
    pub dropped_unresolved: usize,
}

/// Load the IFR source from the first existing candidate path
#[must_use]
pub fn load(candidates: &[PathBuf], countries: &CountryTables) -> LoadOutcome<IfrTable> {
    let Some(path) = resolve_candidates(candidates) else {
        return LoadOutcome::Absent {
            reason: format!("no candidate file exists (tried {})", candidate_list(candidates)),
        };
    };
    let (mut reader, columns) = match open_csv(&path) {
        Ok(v) => v,
        Err(reason) => return LoadOutcome::Absent { reason },
    };

    let mut rows = Vec::new();
    let mut dropped_unresolved = 0usize;
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(raw_country) = columns.get(&record, "country_code") else {
            continue;
        };
        let Some(country_code) = countries.normalize(raw_country) else {
            dropped_unresolved += 1;
            continue;
        };
        let Some(industry_code) = columns.get(&record, "industry_code") else {
            continue;
        };
        let Some(year) = columns.get(&record, "year").and_then(parse_year) else {
            continue;
        };
        rows.push(IfrRecord {
            country_code,
            industry_code: industry_code.to_string(),
            year,
            robot_stock: columns.get(&record, "robot_stock").and_then(parse_f64),
            robot_wrkr_stock_95: columns
                .get(&record, "robot_wrkr_stock_95")
                .and_then(parse_f64),
            employment: columns.get(&record, "employment").and_then(parse_f64),
        });
    }

    log::info!(
        "Loaded IFR: {} rows from {} ({} unresolved country tokens dropped)",
        rows.len(),
        path.display(),
        dropped_unresolved
    );
    LoadOutcome::Loaded {
        table: IfrTable {
            rows,
            raw_columns: columns.columns().to_vec(),
            dropped_unresolved,
        },
        resolved_from: path,
    }
}

pub(crate) fn candidate_list(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
