//! Per-subgroup usability gate.
//!
//! A subgroup (one industry's rows, say) enters estimation only with enough
//! countries, enough observations, and genuine variation in the moderator.
//! Failing subgroups are skipped with a recorded reason, never silently
//! dropped and never fatal.

use rustc_hash::FxHashSet;

use crate::config::GateConfig;
use crate::panel::row::PanelRow;
use crate::utils::stats;

/// Outcome of gating one subgroup
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Subgroup may be estimated
    Usable { n_obs: usize, n_countries: usize },
    /// Subgroup is excluded; the reason string is surfaced to the run log
    /// and the skip record
    Skipped { reason: String, n_obs: usize },
}

impl GateDecision {
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Usable { .. })
    }
}

/// Evaluate the gate for a subgroup, with the moderator read off each row
/// by the supplied accessor
pub fn evaluate<F>(rows: &[&PanelRow], moderator: F, config: &GateConfig) -> GateDecision
where
    F: Fn(&PanelRow) -> Option<f64>,
{
    let n_obs = rows.len();
    let countries: FxHashSet<&str> = rows.iter().map(|r| r.country_code.as_str()).collect();
    let n_countries = countries.len();

    if n_countries < config.min_countries {
        return GateDecision::Skipped {
            reason: format!("only {n_countries} countries"),
            n_obs,
        };
    }
    if n_obs < config.min_obs {
        return GateDecision::Skipped {
            reason: format!("only {n_obs} obs"),
            n_obs,
        };
    }
    let moderator_values: Vec<f64> = rows.iter().filter_map(|r| moderator(r)).collect();
    let sd = stats::sample_std(&moderator_values).unwrap_or(0.0);
    if sd < config.min_moderator_sd {
        return GateDecision::Skipped {
            reason: "no variation in moderator".to_string(),
            n_obs,
        };
    }
    GateDecision::Usable { n_obs, n_countries }
}
