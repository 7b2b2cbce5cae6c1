//! Weighted many-to-one crosswalk aggregation.
//!
//! When several detailed source industries fold into one canonical bucket,
//! their values are combined as a weighted average using an externally
//! supplied importance weight, with an unweighted-mean fallback when the
//! weights carry no mass.

use std::path::Path;

use itertools::Itertools;

use crate::error::Result;
use crate::normalize::industry::is_manufacturing_division;
use crate::source::weights::{AutomationWeight, Ind1990Entry};

/// One (value, weight) pair entering an aggregation
#[derive(Debug, Clone, Copy)]
pub struct WeightedValue {
    pub value: f64,
    pub weight: f64,
}

/// Weighted average `Σ(wᵢ·vᵢ)/Σ(wᵢ)`; falls back to the unweighted mean
/// when all weights sum to zero. `None` for an empty slice.
#[must_use]
pub fn weighted_average(items: &[WeightedValue]) -> Option<f64> {
    if items.is_empty() {
        return None;
    }
    let weight_sum: f64 = items.iter().map(|i| i.weight).sum();
    if weight_sum == 0.0 {
        let n = items.len() as f64;
        return Some(items.iter().map(|i| i.value).sum::<f64>() / n);
    }
    Some(items.iter().map(|i| i.weight * i.value).sum::<f64>() / weight_sum)
}

/// Automation weight aggregated to one NACE Rev. 2 division
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Nace2Weight {
    pub nace2: i64,
    #[serde(rename = "auto_weight_nace2")]
    pub auto_weight: f64,
    /// Distinct detailed industries folded into this division
    pub n_sources: usize,
    /// Mass of the importance weights behind the aggregate
    pub w_ind_sum: f64,
}

/// Fold ind1990-level automation weights into NACE2 manufacturing divisions
/// via the crosswalk, weighting by `w_ind` (missing importance weights count
/// as zero mass, triggering the unweighted fallback when nothing carries
/// weight).
#[must_use]
pub fn aggregate_weights_to_nace2(
    weights: &[AutomationWeight],
    crosswalk: &[Ind1990Entry],
) -> Vec<Nace2Weight> {
    let mut joined: Vec<(i64, &AutomationWeight)> = Vec::new();
    for entry in crosswalk {
        if !is_manufacturing_division(entry.nace2) {
            continue;
        }
        for w in weights.iter().filter(|w| w.industry_id == entry.ind1990) {
            joined.push((entry.nace2, w));
        }
    }
    joined.sort_by_key(|(nace2, w)| (*nace2, w.industry_id.clone()));

    joined
        .into_iter()
        .chunk_by(|(nace2, _)| *nace2)
        .into_iter()
        .map(|(nace2, group)| {
            let members: Vec<&AutomationWeight> = group.map(|(_, w)| w).collect();
            let items: Vec<WeightedValue> = members
                .iter()
                .map(|w| WeightedValue {
                    value: w.auto_weight,
                    weight: w.w_ind.unwrap_or(0.0),
                })
                .collect();
            let n_sources = members
                .iter()
                .map(|w| w.industry_id.as_str())
                .unique()
                .count();
            Nace2Weight {
                nace2,
                // members is non-empty within a chunk
                auto_weight: weighted_average(&items).unwrap_or(0.0),
                n_sources,
                w_ind_sum: items.iter().map(|i| i.weight).sum(),
            }
        })
        .collect()
}

/// Persist the aggregated division weights for the later merge with
/// country-year stocks
pub fn write_nace2_weights_csv(path: &Path, rows: &[Nace2Weight]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(crate::error::PanelError::from)?;
    log::info!("Saved {} NACE2 weights to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_average_uses_supplied_weights() {
        let items = [
            WeightedValue { value: 10.0, weight: 1.0 },
            WeightedValue { value: 20.0, weight: 3.0 },
        ];
        assert_eq!(weighted_average(&items), Some(17.5));
    }

    #[test]
    fn zero_weight_mass_falls_back_to_unweighted_mean() {
        let items = [
            WeightedValue { value: 10.0, weight: 0.0 },
            WeightedValue { value: 20.0, weight: 0.0 },
        ];
        assert_eq!(weighted_average(&items), Some(15.0));
        assert_eq!(weighted_average(&[]), None);
    }

    #[test]
    fn aggregation_folds_detailed_codes_and_filters_manufacturing() {
        let weights = vec![
            AutomationWeight { industry_id: "100".into(), auto_weight: 10.0, w_ind: Some(1.0) },
            AutomationWeight { industry_id: "101".into(), auto_weight: 20.0, w_ind: Some(3.0) },
            AutomationWeight { industry_id: "900".into(), auto_weight: 99.0, w_ind: Some(5.0) },
        ];
        let crosswalk = vec![
            Ind1990Entry { ind1990: "100".into(), nace2: 20 },
            Ind1990Entry { ind1990: "101".into(), nace2: 20 },
            Ind1990Entry { ind1990: "900".into(), nace2: 64 }, // not manufacturing
        ];
        let agg = aggregate_weights_to_nace2(&weights, &crosswalk);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].nace2, 20);
        assert_eq!(agg[0].auto_weight, 17.5);
        assert_eq!(agg[0].n_sources, 2);
        assert_eq!(agg[0].w_ind_sum, 4.0);
    }

    #[test]
    fn aggregated_weights_persist_under_the_merge_column_names() {
        let rows = vec![Nace2Weight {
            nace2: 20,
            auto_weight: 17.5,
            n_sources: 2,
            w_ind_sum: 4.0,
        }];
        let dir = std::env::temp_dir().join(format!("robot-panel-nace2-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("auto_weights_nace2.csv");

        write_nace2_weights_csv(&path, &rows).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("nace2,auto_weight_nace2,n_sources,w_ind_sum")
        );
        assert_eq!(lines.next(), Some("20,17.5,2,4.0"));
    }
}
