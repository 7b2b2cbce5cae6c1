//! The assembled panel row: one record per (entity, year).

use serde::{Deserialize, Serialize};

/// One row of the assembled country × industry × year panel.
///
/// Field order is the column order of the persisted artifact. Measured
/// values stay optional throughout; derived variables are filled by the
/// derive stage and the usability of a row for estimation is decided by
/// per-specification requirements, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub country_code: String,
    /// Detailed IFR industry code (the entity-defining industry key)
    pub industry_code: String,
    /// Canonical NACE Rev. 2 bucket the industry maps to
    pub nace_r2_code: String,
    pub year: i32,
    /// `country_code` + "_" + `industry_code`
    pub entity: String,
    pub year_int: i32,
    /// ln(LAB_QI), floor-clipped
    pub ln_hours: Option<f64>,
    /// ln(robots per 1000 workers); zero stocks are missing, not clipped
    pub ln_robots: Option<f64>,
    /// `ln_robots` one year earlier within the same entity
    pub ln_robots_lag1: Option<f64>,
    /// ln(VA_PYP), floor-clipped
    pub ln_va: Option<f64>,
    /// ln(CAP_QI), floor-clipped
    pub ln_cap: Option<f64>,
    /// ln(GDP), floor-clipped
    pub ln_gdp: Option<f64>,
    pub unemployment: Option<f64>,
    /// Baseline bargaining coverage, time-invariant per country
    pub adjcov: Option<f64>,
    /// Baseline coordination index, time-invariant per country
    pub coord: Option<f64>,
    /// `adjcov` centered on the full-panel mean (one constant per run)
    pub adjcov_centered: Option<f64>,
    /// 1 if `coord` ≥ threshold, 0 if below, missing when `coord` missing
    pub high_coord: Option<i32>,
    /// 1 if the NACE bucket is in the static high robot-use set
    pub high_robot_industry: i32,
    pub robot_wrkr_stock_95: Option<f64>,
    #[serde(rename = "LAB_QI")]
    pub lab_qi: Option<f64>,
    #[serde(rename = "VA_PYP")]
    pub va_pyp: Option<f64>,
    #[serde(rename = "CAP_QI")]
    pub cap_qi: Option<f64>,
    /// Raw GDP level; kept off the artifact (only `ln_gdp` is persisted)
    #[serde(skip)]
    pub gdp: Option<f64>,
}

impl PanelRow {
    /// Named-variable accessor used by requirement lists and estimation
    /// specs (`require = ["ln_hours", ...]`)
    #[must_use]
    pub fn var(&self, name: &str) -> Option<f64> {
        match name {
            "ln_hours" => self.ln_hours,
            "ln_robots" => self.ln_robots,
            "ln_robots_lag1" => self.ln_robots_lag1,
            "ln_va" => self.ln_va,
            "ln_cap" => self.ln_cap,
            "ln_gdp" => self.ln_gdp,
            "unemployment" => self.unemployment,
            "adjcov" => self.adjcov,
            "coord" => self.coord,
            "adjcov_centered" => self.adjcov_centered,
            "high_coord" => self.high_coord.map(f64::from),
            "high_robot_industry" => Some(f64::from(self.high_robot_industry)),
            "robot_wrkr_stock_95" => self.robot_wrkr_stock_95,
            "LAB_QI" => self.lab_qi,
            "VA_PYP" => self.va_pyp,
            "CAP_QI" => self.cap_qi,
            _ => None,
        }
    }

    /// Whether every named variable is present on this row
    #[must_use]
    pub fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.var(n).is_some())
    }
}
