//! Shift-share inputs: industry automation weights, the ind1990 → NACE2
//! crosswalk, and the wide country × year robot-stock table.
//!
//! All three are optional; the shift-share exposure path only runs when
//! every one of them resolves.

use std::path::PathBuf;

use crate::normalize::CountryTables;
use crate::source::ifr::candidate_list;
use crate::source::{LoadOutcome, open_csv, parse_f64, parse_year, resolve_candidates};

/// One industry automation weight (ind1990 classification, time-invariant)
#[derive(Debug, Clone)]
pub struct AutomationWeight {
    pub industry_id: String,
    /// Task-replaceability measure used as the exposure weight
    pub auto_weight: f64,
    /// Importance/size measure used when folding into NACE2 buckets
    pub w_ind: Option<f64>,
}

/// One crosswalk entry from ind1990 to a NACE Rev. 2 division
#[derive(Debug, Clone)]
pub struct Ind1990Entry {
    pub ind1990: String,
    pub nace2: i64,
}

/// Load automation weights. Rows with an "n/a" industry id or a missing
/// weight are dropped, matching the source's sentinel convention.
#[must_use]
pub fn load_weights(candidates: &[PathBuf]) -> LoadOutcome<Vec<AutomationWeight>> {
    let Some(path) = resolve_candidates(candidates) else {
        return LoadOutcome::Absent {
            reason: format!("no candidate file exists (tried {})", candidate_list(candidates)),
        };
    };
    let (mut reader, columns) = match open_csv(&path) {
        Ok(v) => v,
        Err(reason) => return LoadOutcome::Absent { reason },
    };
    for required in ["ind1990", "replaceability_ind"] {
        if !columns.has(required) {
            return LoadOutcome::Absent {
                reason: format!("{} lacks required column '{required}'", path.display()),
            };
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(industry_id) = columns.get(&record, "ind1990") else {
            continue;
        };
        let industry_id = industry_id.trim();
        if industry_id.is_empty() || industry_id.to_ascii_lowercase().contains("n/a") {
            continue;
        }
        let Some(auto_weight) = columns.get(&record, "replaceability_ind").and_then(parse_f64)
        else {
            continue;
        };
        rows.push(AutomationWeight {
            industry_id: industry_id.to_string(),
            auto_weight,
            w_ind: columns.get(&record, "w_ind").and_then(parse_f64),
        });
    }

    log::info!(
        "Loaded automation weights: {} industries from {}",
        rows.len(),
        path.display()
    );
    LoadOutcome::Loaded {
        table: rows,
        resolved_from: path,
    }
}

/// Load the ind1990 → NACE2 division crosswalk
#[must_use]
pub fn load_ind1990_crosswalk(candidates: &[PathBuf]) -> LoadOutcome<Vec<Ind1990Entry>> {
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
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(ind1990) = columns.get(&record, "ind1990") else {
            continue;
        };
        let Some(nace2) = columns
            .get(&record, "nace2")
            .and_then(parse_f64)
            .map(|v| v as i64)
        else {
            continue;
        };
        rows.push(Ind1990Entry {
            ind1990: ind1990.trim().to_string(),
            nace2,
        });
    }

    log::info!(
        "Loaded ind1990 crosswalk: {} entries from {}",
        rows.len(),
        path.display()
    );
    LoadOutcome::Loaded {
        table: rows,
        resolved_from: path,
    }
}

/// One (country, year) robot-stock observation from the wide table
#[derive(Debug, Clone)]
pub struct RobotStockObs {
    pub country: String,
    pub year: i32,
    pub robot_stock: f64,
}

/// Load the wide country × year robot-stock table and melt it to long form.
///
/// Year columns are detected from the header (plausible calendar years);
/// the first non-year column is the country label. Labels of the form
/// `XX-Name` reduce to the ISO2 prefix; other labels are kept only when
/// they resolve through the country tables.
#[must_use]
pub fn load_robot_stock_wide(
    candidates: &[PathBuf],
    countries: &CountryTables,
) -> LoadOutcome<Vec<RobotStockObs>> {
    let Some(path) = resolve_candidates(candidates) else {
        return LoadOutcome::Absent {
            reason: format!("no candidate file exists (tried {})", candidate_list(candidates)),
        };
    };
    let (mut reader, columns) = match open_csv(&path) {
        Ok(v) => v,
        Err(reason) => return LoadOutcome::Absent { reason },
    };

    let mut year_cols: Vec<(usize, i32)> = Vec::new();
    let mut country_col: Option<usize> = None;
    for (i, header) in columns.columns().iter().enumerate() {
        match parse_year(header) {
            Some(y) if (1900..=2100).contains(&y) => year_cols.push((i, y)),
            _ => {
                if country_col.is_none() {
                    country_col = Some(i);
                }
            }
        }
    }
    let Some(country_col) = country_col else {
        return LoadOutcome::Absent {
            reason: format!("{}: no country column detected", path.display()),
        };
    };
    if year_cols.is_empty() {
        return LoadOutcome::Absent {
            reason: format!("{}: no year columns detected", path.display()),
        };
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(label) = record.get(country_col) else {
            continue;
        };
        let Some(country) = country_from_label(label, countries) else {
            continue;
        };
        for &(col, year) in &year_cols {
            if let Some(stock) = record.get(col).and_then(parse_f64) {
                rows.push(RobotStockObs {
                    country: country.clone(),
                    year,
                    robot_stock: stock,
                });
            }
        }
    }
    rows.sort_by(|a, b| (&a.country, a.year).cmp(&(&b.country, b.year)));
    rows.dedup_by(|a, b| a.country == b.country && a.year == b.year);

    log::info!(
        "Loaded robot stock (wide): {} country-year observations from {}",
        rows.len(),
        path.display()
    );
    LoadOutcome::Loaded {
        table: rows,
        resolved_from: path,
    }
}

fn country_from_label(label: &str, countries: &CountryTables) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    // "DE-Germany" style labels carry the ISO2 prefix
    if let Some((prefix, _)) = label.split_once('-') {
        let prefix = prefix.trim();
        if prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return countries.normalize(prefix);
        }
    }
    countries.normalize(label)
}
