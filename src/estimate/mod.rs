//! Estimation layer: the external-estimator seam, panel preparation, the
//! whole-panel model runner, and the per-industry heterogeneity runner.
//!
//! The fixed-effects estimator itself is an external collaborator: the
//! runner hands it a prepared design and records whatever comes back,
//! including failures. A default [`WithinOls`] implementation is provided
//! as a thin wrapper over a least-squares library call.

pub mod heterogeneity;
pub mod model;
pub mod panel_models;
pub mod prep;
pub mod within_ols;

pub use heterogeneity::{HeterogeneityOutcome, IndustryResult, run_industry_heterogeneity};
pub use model::{Estimator, FitSummary, RegressionInput};
pub use panel_models::{ModelResult, Moderator, PanelModelsOutcome, run_panel_models};
pub use prep::{prepare_panel, select_controls};
pub use within_ols::WithinOls;
