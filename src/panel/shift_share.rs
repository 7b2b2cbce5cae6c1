//! Shift-share exposure construction.
//!
//! A (country × year) panel of a continuous exposure measure is
//! cross-joined against an (industry) panel of fixed weights, producing the
//! full (country × industry × year) Cartesian product, then multiplied.
//! Every country-year pairs with every industry regardless of whether the
//! pairing is economically meaningful; downstream filtering, not the cross
//! join, removes nonsensical combinations.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::source::weights::{AutomationWeight, RobotStockObs};

/// One row of the exposure panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureRow {
    pub country: String,
    pub industry_id: String,
    pub year: i32,
    pub robot_stock: f64,
    pub auto_weight: f64,
    /// Level exposure: `robot_stock × auto_weight`
    pub robot_exposure: f64,
    /// ln(1 + robot_stock); defined at zero stocks
    pub ln1p_robot_stock: f64,
    /// Log-variant exposure: `ln1p_robot_stock × auto_weight`
    pub robot_exposure_log: f64,
}

/// Build the exposure panel as the Cartesian product of stocks and weights,
/// sorted by (country, industry, year)
#[must_use]
pub fn build_exposure(
    stocks: &[RobotStockObs],
    weights: &[AutomationWeight],
) -> Vec<ExposureRow> {
    let mut rows = Vec::with_capacity(stocks.len() * weights.len());
    for stock in stocks {
        for weight in weights {
            let ln1p = stock.robot_stock.ln_1p();
            rows.push(ExposureRow {
                country: stock.country.clone(),
                industry_id: weight.industry_id.clone(),
                year: stock.year,
                robot_stock: stock.robot_stock,
                auto_weight: weight.auto_weight,
                robot_exposure: stock.robot_stock * weight.auto_weight,
                ln1p_robot_stock: ln1p,
                robot_exposure_log: ln1p * weight.auto_weight,
            });
        }
    }
    rows.sort_by(|a, b| {
        (&a.country, &a.industry_id, a.year).cmp(&(&b.country, &b.industry_id, b.year))
    });
    rows
}

/// Persist the exposure panel
pub fn write_exposure_csv(path: &Path, rows: &[ExposureRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(crate::error::PanelError::from)?;
    log::info!("Saved {} exposure rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(country: &str, year: i32, v: f64) -> RobotStockObs {
        RobotStockObs {
            country: country.to_string(),
            year,
            robot_stock: v,
        }
    }

    fn weight(id: &str, w: f64) -> AutomationWeight {
        AutomationWeight {
            industry_id: id.to_string(),
            auto_weight: w,
            w_ind: None,
        }
    }

    #[test]
    fn cartesian_product_covers_every_combination() {
        let stocks: Vec<RobotStockObs> = ["DE", "FR"]
            .iter()
            .flat_map(|c| (1995..1998).map(|y| stock(c, y, 100.0)))
            .collect();
        let weights: Vec<AutomationWeight> =
            ["100", "101", "102", "103"].iter().map(|i| weight(i, 0.5)).collect();

        let rows = build_exposure(&stocks, &weights);
        assert_eq!(rows.len(), 2 * 3 * 4);
        // each row is exactly one (country, year) times one industry
        assert!(rows.iter().all(|r| r.robot_exposure == 100.0 * 0.5));
        // deterministic sort key
        let mut sorted = rows.clone();
        sorted.sort_by(|a, b| {
            (&a.country, &a.industry_id, a.year).cmp(&(&b.country, &b.industry_id, b.year))
        });
        assert_eq!(rows, sorted);
    }

    #[test]
    fn log_variant_is_defined_at_zero_stock() {
        let rows = build_exposure(&[stock("DE", 2000, 0.0)], &[weight("100", 2.0)]);
        assert_eq!(rows[0].ln1p_robot_stock, 0.0);
        assert_eq!(rows[0].robot_exposure_log, 0.0);
        assert!(rows[0].robot_exposure_log.is_finite());
    }
}
