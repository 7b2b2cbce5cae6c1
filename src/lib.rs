//! A Rust library for assembling a country × industry × year panel of
//! robot adoption, labour outcomes, and institutional coverage across EU
//! economies, with source diagnostics and per-industry heterogeneity
//! estimation over the assembled artifact.

pub mod config;
pub mod derive;
pub mod diagnostics;
pub mod error;
pub mod estimate;
pub mod gate;
pub mod normalize;
pub mod panel;
pub mod source;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{GateConfig, GreeceSpelling, PanelConfig, SourcePaths};
pub use error::{PanelError, Result};

// Identifier normalization
pub use normalize::{CountryTables, IndustryCrosswalk};

// Panel assembly and the versioned artifact
pub use panel::{ArtifactManifest, PanelArtifact, PanelRow, PanelSources, assemble};

// Gate and estimation seam
pub use estimate::{Estimator, FitSummary, RegressionInput, WithinOls, run_industry_heterogeneity};
pub use gate::GateDecision;

// Diagnostics surfaces
pub use diagnostics::{DataCheckReport, SampleDiagnostics};
