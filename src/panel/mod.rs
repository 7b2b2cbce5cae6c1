//! Panel assembly: joins over the canonical (country, industry, year) key,
//! weighted crosswalk aggregation, shift-share exposure construction, and
//! the versioned panel artifact handed to downstream stages.

pub mod artifact;
pub mod assemble;
pub mod crosswalk;
pub mod row;
pub mod shift_share;

pub use artifact::{ArtifactManifest, PanelArtifact, SCHEMA_VERSION};
pub use assemble::{AssemblySummary, PanelSources, assemble};
pub use row::PanelRow;
