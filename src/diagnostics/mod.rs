//! Read-only diagnostics over sources and the assembled panel.
//!
//! Two surfaces: the pre-assembly data check (per-source presence, year and
//! column coverage) and the post-assembly sample diagnostics (how much of
//! the baseline sample survives stricter variable requirements). Neither
//! ever mutates anything; both return report values and log them.

pub mod datacheck;
pub mod sample;

pub use datacheck::{DataCheckReport, SourceCheck};
pub use sample::SampleDiagnostics;
