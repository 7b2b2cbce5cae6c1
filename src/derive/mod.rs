//! Derived-variable engine.
//!
//! Runs once over the assembled candidate panel, in a fixed order: logs of
//! the level variables, the global centering constant, threshold and
//! industry indicators, then the required-variable row drop and the
//! deterministic (entity, year) sort. The centering mean is computed over
//! the full pre-drop panel so every downstream subgroup shares one
//! centering constant.

use crate::config::PanelConfig;
use crate::normalize::IndustryCrosswalk;
use crate::panel::row::PanelRow;
use crate::utils::stats;

/// Variables a row must carry to stay in the panel at all (the baseline
/// estimation requirement; stricter specs impose more on top)
pub const REQUIRED_VARS: [&str; 4] = ["ln_hours", "ln_robots_lag1", "ln_va", "ln_cap"];

/// Accounting for one derivation pass
#[derive(Debug, Clone)]
pub struct DeriveSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Full-panel mean used for `adjcov_centered`; `None` when the
    /// institutional source was absent
    pub adjcov_mean: Option<f64>,
}

/// ln(max(x, floor)): keeps the log defined at zero by deliberate policy
#[must_use]
pub fn ln_floor(x: f64, floor: f64) -> f64 {
    x.max(floor).ln()
}

/// Derive all variables in place, drop rows missing required variables,
/// and sort deterministically
#[must_use]
pub fn apply(
    mut rows: Vec<PanelRow>,
    config: &PanelConfig,
    crosswalk: &IndustryCrosswalk,
) -> (Vec<PanelRow>, DeriveSummary) {
    let rows_before = rows.len();

    for row in &mut rows {
        row.ln_hours = row.lab_qi.map(|v| ln_floor(v, config.log_floor));
        row.ln_va = row.va_pyp.map(|v| ln_floor(v, config.log_floor));
        row.ln_cap = row.cap_qi.map(|v| ln_floor(v, config.log_floor));
        row.ln_gdp = row.gdp.map(|v| ln_floor(v, config.log_floor));
        row.high_coord = row
            .coord
            .map(|c| i32::from(c >= config.coord_high_threshold));
        row.high_robot_industry = i32::from(crosswalk.is_high_robot(&row.nace_r2_code));
    }

    // Centering constant: fixed over the entire assembled panel before any
    // filtering, and reused by every per-subgroup regression.
    let adjcov_values: Vec<f64> = rows.iter().filter_map(|r| r.adjcov).collect();
    let adjcov_mean = stats::mean(&adjcov_values);
    if let Some(mean) = adjcov_mean {
        for row in &mut rows {
            row.adjcov_centered = row.adjcov.map(|v| v - mean);
        }
    }

    rows.retain(|r| r.has_all(&REQUIRED_VARS));
    rows.sort_by(|a, b| (&a.entity, a.year).cmp(&(&b.entity, b.year)));

    let summary = DeriveSummary {
        rows_before,
        rows_after: rows.len(),
        adjcov_mean,
    };
    log::info!(
        "Derived variables: {} of {} rows satisfy {:?}",
        summary.rows_after,
        summary.rows_before,
        REQUIRED_VARS
    );
    (rows, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelConfig;

    fn base_row(entity: &str, year: i32) -> PanelRow {
        let (country, industry) = entity.split_once('_').unwrap();
        PanelRow {
            country_code: country.to_string(),
            industry_code: industry.to_string(),
            nace_r2_code: "C28".to_string(),
            year,
            entity: entity.to_string(),
            year_int: year,
            ln_hours: None,
            ln_robots: Some(1.0),
            ln_robots_lag1: Some(0.9),
            ln_va: None,
            ln_cap: None,
            ln_gdp: None,
            unemployment: None,
            adjcov: None,
            coord: None,
            adjcov_centered: None,
            high_coord: None,
            high_robot_industry: 0,
            robot_wrkr_stock_95: Some(2.7),
            lab_qi: Some(100.0),
            va_pyp: Some(50.0),
            cap_qi: Some(25.0),
            gdp: Some(1000.0),
        }
    }

    #[test]
    fn floor_clip_keeps_logs_finite() {
        let config = PanelConfig::default();
        let mut row = base_row("DE_28", 2000);
        row.lab_qi = Some(0.0);
        row.va_pyp = Some(-3.0);
        let (rows, _) = apply(vec![row], &config, &IndustryCrosswalk::new());
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert!(r.ln_hours.unwrap().is_finite());
        assert_eq!(r.ln_hours.unwrap(), 0.1_f64.ln());
        assert_eq!(r.ln_va.unwrap(), 0.1_f64.ln());
    }

    #[test]
    fn centering_uses_full_panel_mean_before_dropping() {
        let config = PanelConfig::default();
        let mut kept = base_row("DE_28", 2000);
        kept.adjcov = Some(80.0);
        // this row leaves the panel (no lag) but still feeds the mean
        let mut dropped = base_row("FR_28", 2000);
        dropped.adjcov = Some(40.0);
        dropped.ln_robots_lag1 = None;

        let (rows, summary) = apply(vec![kept, dropped], &config, &IndustryCrosswalk::new());
        assert_eq!(summary.adjcov_mean, Some(60.0));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].adjcov_centered, Some(20.0));
    }

    #[test]
    fn high_coord_is_null_when_coord_missing() {
        let config = PanelConfig::default();
        let mut with = base_row("DE_28", 2000);
        with.coord = Some(4.0);
        let mut below = base_row("DE_28", 2001);
        below.coord = Some(3.9);
        let without = base_row("DE_28", 2002);

        let (rows, _) = apply(vec![with, below, without], &config, &IndustryCrosswalk::new());
        assert_eq!(rows[0].high_coord, Some(1));
        assert_eq!(rows[1].high_coord, Some(0));
        assert_eq!(rows[2].high_coord, None);
    }

    #[test]
    fn rows_missing_required_vars_are_dropped_and_sorted() {
        let config = PanelConfig::default();
        let b = base_row("FR_28", 2000);
        let a = base_row("DE_28", 2001);
        let mut gone = base_row("AT_28", 2000);
        gone.lab_qi = None; // no outcome

        let (rows, summary) = apply(vec![b, a, gone], &config, &IndustryCrosswalk::new());
        assert_eq!(summary.rows_before, 3);
        assert_eq!(summary.rows_after, 2);
        assert_eq!(rows[0].entity, "DE_28");
        assert_eq!(rows[1].entity, "FR_28");
    }
}
