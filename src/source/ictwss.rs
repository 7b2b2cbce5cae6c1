//! ICTWSS collective-bargaining institutions source (country × year).
//!
//! Bargaining coverage (`AdjCov`) and coordination (`Coord`), keyed by ISO3.
//! Optional: absence degrades the institutional columns to fully missing.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::normalize::CountryTables;
use crate::source::ifr::candidate_list;
use crate::source::{LoadOutcome, open_csv, parse_f64, parse_year, resolve_candidates};

/// Institutional variables the pipeline needs
pub const REQUIRED_COLUMNS: [&str; 2] = ["AdjCov", "Coord"];

/// One institutions row after ISO3 → ISO2 normalization
#[derive(Debug, Clone)]
pub struct IctwssRecord {
    pub country_code: String,
    pub year: i32,
    /// Adjusted bargaining coverage (share of employees covered)
    pub adj_cov: Option<f64>,
    /// Wage-setting coordination index
    pub coord: Option<f64>,
}

/// ICTWSS source table
#[derive(Debug)]
pub struct IctwssTable {
    pub rows: Vec<IctwssRecord>,
    pub raw_columns: Vec<String>,
    pub dropped_unresolved: usize,
}

/// Time-invariant per-country institutional baseline
#[derive(Debug, Clone)]
pub struct InstitutionalBaseline {
    pub country_code: String,
    pub adj_cov: Option<f64>,
    pub coord: Option<f64>,
}

/// Load the ICTWSS source
#[must_use]
pub fn load(candidates: &[PathBuf], countries: &CountryTables) -> LoadOutcome<IctwssTable> {
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
        let Some(iso3) = columns.get(&record, "iso3") else {
            continue;
        };
        let Some(country_code) = countries.normalize(iso3) else {
            dropped_unresolved += 1;
            continue;
        };
        let Some(year) = columns.get(&record, "year").and_then(parse_year) else {
            continue;
        };
        rows.push(IctwssRecord {
            country_code,
            year,
            adj_cov: columns.get(&record, "AdjCov").and_then(parse_f64),
            coord: columns.get(&record, "Coord").and_then(parse_f64),
        });
    }

    log::info!(
        "Loaded ICTWSS: {} rows from {} ({} unresolved iso3 tokens dropped)",
        rows.len(),
        path.display(),
        dropped_unresolved
    );
    LoadOutcome::Loaded {
        table: IctwssTable {
            rows,
            raw_columns: columns.columns().to_vec(),
            dropped_unresolved,
        },
        resolved_from: path,
    }
}

/// Collapse the institutions panel to one time-invariant baseline per
/// country: the mean of each variable over the inclusive window, skipping
/// missing values; a country with no usable value in the window gets `None`.
#[must_use]
pub fn baseline(table: &IctwssTable, window: (i32, i32)) -> Vec<InstitutionalBaseline> {
    let (from, to) = window;
    let mut acc: FxHashMap<String, (Vec<f64>, Vec<f64>)> = FxHashMap::default();
    for row in &table.rows {
        if row.year < from || row.year > to {
            continue;
        }
        let entry = acc.entry(row.country_code.clone()).or_default();
        if let Some(v) = row.adj_cov {
            entry.0.push(v);
        }
        if let Some(v) = row.coord {
            entry.1.push(v);
        }
    }
    let mut baselines: Vec<InstitutionalBaseline> = acc
        .into_iter()
        .map(|(country_code, (cov, coord))| InstitutionalBaseline {
            country_code,
            adj_cov: crate::utils::stats::mean(&cov),
            coord: crate::utils::stats::mean(&coord),
        })
        .collect();
    baselines.sort_by(|a, b| a.country_code.cmp(&b.country_code));
    baselines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<IctwssRecord>) -> IctwssTable {
        IctwssTable {
            rows,
            raw_columns: vec![],
            dropped_unresolved: 0,
        }
    }

    fn rec(cc: &str, year: i32, cov: Option<f64>, coord: Option<f64>) -> IctwssRecord {
        IctwssRecord {
            country_code: cc.to_string(),
            year,
            adj_cov: cov,
            coord,
        }
    }

    #[test]
    fn baseline_means_skip_missing_and_respect_window() {
        let t = table(vec![
            rec("DE", 1990, Some(80.0), Some(4.0)),
            rec("DE", 1994, None, Some(5.0)),
            rec("DE", 1995, Some(70.0), None),
            rec("DE", 1999, Some(10.0), Some(1.0)), // outside window
            rec("EE", 1993, None, None),
        ]);
        let b = baseline(&t, (1990, 1995));
        assert_eq!(b.len(), 2);
        let de = &b[0];
        assert_eq!(de.country_code, "DE");
        assert_eq!(de.adj_cov, Some(75.0));
        assert_eq!(de.coord, Some(4.5));
        let ee = &b[1];
        assert_eq!(ee.adj_cov, None);
        assert_eq!(ee.coord, None);
    }
}
